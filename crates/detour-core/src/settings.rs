//! Process-wide settings context
//!
//! One owned struct replaced field by field on each inbound configuration message.
//! Everything runs on one thread, so a scan never sees a half-applied update.

use detour_embeds::InterceptionBehavior;
use detour_rules::{normalize, RuleSet};

use crate::messages::ConfigUpdate;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    behavior: Option<InterceptionBehavior>,
    button_label: String,
    auto_redirect: bool,
    rules: RuleSet,
    ready: bool,
}

/// What an applied update changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsChange {
    /// The embed scan must run again
    pub rescan: bool,
    /// New label to persist
    pub label: Option<String>,
}

impl Settings {
    pub fn new(button_label: String) -> Self {
        Self {
            behavior: None,
            button_label,
            auto_redirect: false,
            rules: RuleSet::default(),
            ready: false,
        }
    }

    /// `None` until the settings peer has sent a recognized behavior.
    pub fn behavior(&self) -> Option<InterceptionBehavior> {
        self.behavior
    }

    pub fn button_label(&self) -> &str {
        &self.button_label
    }

    pub fn auto_redirect(&self) -> bool {
        self.auto_redirect
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether at least one configuration message has arrived.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Whether mutations should schedule scans right now.
    pub fn monitors_mutations(&self) -> bool {
        self.behavior
            .map(|behavior| behavior.monitors_mutations())
            .unwrap_or(false)
    }

    pub fn apply(&mut self, update: &ConfigUpdate) -> SettingsChange {
        let previous_behavior = self.behavior;

        if let Some(raw) = update.interception_behavior.as_deref() {
            match InterceptionBehavior::from_wire(raw) {
                Some(behavior) => self.behavior = Some(behavior),
                None => tracing::debug!(value = %raw, "Ignoring unknown interception behavior"),
            }
        }

        let label = update
            .button_label
            .as_ref()
            .filter(|label| !label.is_empty())
            .cloned();
        if let Some(label) = &label {
            self.button_label = label.clone();
        }

        if let Some(enabled) = update.auto_redirect_on_click.as_ref().and_then(|a| a.enabled()) {
            self.auto_redirect = enabled;
        }

        if let Some(raw) = update.url_rules_config.as_ref().filter(|raw| !raw.is_null()) {
            self.rules = normalize(raw);
        }

        let rescan = !self.ready || self.behavior != previous_behavior || label.is_some();
        self.ready = true;

        tracing::info!(
            behavior = ?self.behavior,
            auto_redirect = self.auto_redirect,
            mode = %self.rules.mode(),
            rescan,
            "Applied configuration update"
        );

        SettingsChange { rescan, label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::AutoRedirect;
    use detour_rules::RuleMode;
    use serde_json::json;

    fn settings() -> Settings {
        Settings::new("Watch on".to_string())
    }

    #[test]
    fn test_initial_state() {
        let settings = settings();
        assert_eq!(settings.behavior(), None);
        assert!(!settings.is_ready());
        assert!(!settings.auto_redirect());
        assert!(!settings.monitors_mutations());
        assert_eq!(settings.rules(), &RuleSet::default());
    }

    #[test]
    fn test_first_message_always_rescans() {
        let mut settings = settings();
        let change = settings.apply(&ConfigUpdate::default());
        assert!(change.rescan);
        assert!(settings.is_ready());

        let change = settings.apply(&ConfigUpdate::default());
        assert!(!change.rescan);
    }

    #[test]
    fn test_behavior_changes() {
        let mut settings = settings();
        settings.apply(&ConfigUpdate {
            interception_behavior: Some("iframeBehaviorButton".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.behavior(), Some(InterceptionBehavior::Replace));
        assert!(settings.monitors_mutations());

        let change = settings.apply(&ConfigUpdate {
            interception_behavior: Some("iframeBehaviorReplace".to_string()),
            ..Default::default()
        });
        assert!(!change.rescan);

        let change = settings.apply(&ConfigUpdate {
            interception_behavior: Some("somethingElse".to_string()),
            ..Default::default()
        });
        assert!(!change.rescan);
        assert_eq!(settings.behavior(), Some(InterceptionBehavior::Replace));

        let change = settings.apply(&ConfigUpdate {
            interception_behavior: Some("iframeBehaviorNone".to_string()),
            ..Default::default()
        });
        assert!(change.rescan);
        assert!(!settings.monitors_mutations());
    }

    #[test]
    fn test_label_changes() {
        let mut settings = settings();
        settings.apply(&ConfigUpdate::default());

        let change = settings.apply(&ConfigUpdate {
            button_label: Some("Open in player".to_string()),
            ..Default::default()
        });
        assert!(change.rescan);
        assert_eq!(change.label.as_deref(), Some("Open in player"));
        assert_eq!(settings.button_label(), "Open in player");

        let change = settings.apply(&ConfigUpdate {
            button_label: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(change, SettingsChange::default());
        assert_eq!(settings.button_label(), "Open in player");
    }

    #[test]
    fn test_auto_redirect_and_rules() {
        let mut settings = settings();
        settings.apply(&ConfigUpdate {
            auto_redirect_on_click: Some(AutoRedirect::Flag(true)),
            url_rules_config: Some(json!({ "mode": "allowAllExcept", "deny": [] })),
            ..Default::default()
        });
        assert!(settings.auto_redirect());
        assert_eq!(settings.rules().mode(), RuleMode::AllowAllExcept);
        assert_eq!(settings.rules().deny(), RuleSet::default().deny());

        let change = settings.apply(&ConfigUpdate {
            auto_redirect_on_click: Some(AutoRedirect::Legacy("bogus".to_string())),
            url_rules_config: Some(json!(null)),
            ..Default::default()
        });
        assert!(!change.rescan);
        assert!(settings.auto_redirect());
        assert_eq!(settings.rules().mode(), RuleMode::AllowAllExcept);
    }
}
