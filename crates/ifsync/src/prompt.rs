//! Interactive conflict resolution: the dialoguer-backed `Chooser`.

use std::collections::BTreeMap;

use dialoguer::{Confirm, Input, Select};
use tracing::warn;

use ifsync_core::{Choice, Chooser, FieldConfig, InterfaceKey, conflict::DuplicateDecision};

/// Prompts on stderr for every pending decision. A failed prompt
/// (closed tty, ctrl-d) degrades to the conservative answer.
#[derive(Debug, Default)]
pub struct PromptChooser {
    /// `--yes`: answer Replace without prompting, never initialize.
    pub assume_yes: bool,
}

impl Chooser for PromptChooser {
    fn choose_duplicate(&mut self, decision: &DuplicateDecision) -> Choice {
        if self.assume_yes {
            return Choice::Replace;
        }
        eprintln!("{}", describe_duplicate(decision));
        let selection = Select::new()
            .with_prompt("Which values should win?")
            .items(&["Keep (old)", "Replace with (new)"])
            .default(0)
            .interact();
        match selection {
            Ok(1) => Choice::Replace,
            Ok(_) => Choice::Keep,
            Err(e) => {
                warn!(%e, "prompt failed, keeping existing values");
                Choice::Keep
            }
        }
    }

    fn initialize_interface(
        &mut self,
        key: &InterfaceKey,
        fields: &FieldConfig,
    ) -> Option<BTreeMap<String, String>> {
        if self.assume_yes {
            return None;
        }
        let wanted = Confirm::new()
            .with_prompt(format!("Initialize {key}?"))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !wanted {
            return None;
        }
        let mut values = BTreeMap::new();
        for field in &fields.info_fields {
            let value: String = match Input::new()
                .with_prompt(format!("  {field}"))
                .allow_empty(true)
                .interact_text()
            {
                Ok(v) => v,
                Err(e) => {
                    warn!(%e, "prompt failed, leaving interface alone");
                    return None;
                }
            };
            values.insert(field.clone(), value);
        }
        Some(values)
    }
}

/// Both sides of a duplicate, rendered with the `(old)`/`(new)` labels
/// the chooser items refer back to.
fn describe_duplicate(decision: &DuplicateDecision) -> String {
    format!(
        "Duplicate record for {}\n  (old) {}\n  (new) {}",
        decision.key, decision.old, decision.new
    )
}
