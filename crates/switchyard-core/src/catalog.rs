// ── Command catalog ──
//
// Predefined CLI commands and parameterized command templates that users
// may run on devices with command support. Definitions come from the
// inventory; nothing here talks to a device.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const INTERFACE_PLACEHOLDER: &str = "{interface}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommandKind {
    /// Runs against the whole device.
    #[default]
    Global,
    /// Runs against one interface; `{interface}` is replaced by its name.
    Interface,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: CommandKind,
    pub command: String,
}

impl CommandDefinition {
    /// The command line to send.
    pub fn render(&self, interface: Option<&str>) -> Result<String, CoreError> {
        match (self.kind, interface) {
            (CommandKind::Global, _) => Ok(self.command.clone()),
            (CommandKind::Interface, Some(name)) if !name.is_empty() => {
                Ok(self.command.replace(INTERFACE_PLACEHOLDER, name))
            }
            (CommandKind::Interface, _) => Err(CoreError::validation(format!(
                "Command '{}' needs an interface",
                self.name
            ))),
        }
    }
}

/// A free-text template field, validated against `regex`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub regex: String,
}

/// A pick list; the value must be one of `choices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateList {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Command text with `{{field}}` placeholders.
    pub template: String,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
    #[serde(default)]
    pub lists: Vec<TemplateList>,
    /// When set, output containing a match is reported as OK, otherwise FAIL.
    #[serde(default)]
    pub output_match_regex: Option<String>,
    #[serde(default)]
    pub output_match_text: Option<String>,
    #[serde(default)]
    pub output_fail_text: Option<String>,
    /// When set, matching output lines are appended as partial output.
    #[serde(default)]
    pub output_lines_keep_regex: Option<String>,
}

fn placeholder(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

fn compile(pattern: &str) -> Result<Regex, CoreError> {
    Regex::new(pattern).map_err(|e| CoreError::Config {
        message: format!("invalid template pattern '{pattern}': {e}"),
    })
}

impl CommandTemplate {
    /// Validate `values` and expand the template.
    ///
    /// Only placeholders present in the template are required. All problems
    /// are collected and reported together.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, CoreError> {
        let mut command = self.template.clone();
        let mut problems = Vec::new();

        for field in &self.fields {
            let token = placeholder(&field.name);
            if !self.template.contains(&token) {
                continue;
            }
            let label = field.label.as_deref().unwrap_or(&field.name);
            match values.get(&field.name).filter(|v| !v.is_empty()) {
                None => problems.push(format!("{label} - cannot be blank!")),
                Some(value) => {
                    let re = compile(&format!("^(?:{})$", field.regex))?;
                    if re.is_match(value) {
                        command = command.replace(&token, value);
                    } else {
                        problems.push(format!("{label} - Invalid entry: {value}"));
                    }
                }
            }
        }

        for list in &self.lists {
            let token = placeholder(&list.name);
            if !self.template.contains(&token) {
                continue;
            }
            let label = list.label.as_deref().unwrap_or(&list.name);
            match values.get(&list.name).filter(|v| !v.is_empty()) {
                None => problems.push(format!("{label} - cannot be blank!")),
                Some(value) if list.choices.contains(value) => {
                    command = command.replace(&token, value);
                }
                Some(value) => problems.push(format!("{label} - Invalid entry: {value}")),
            }
        }

        if problems.is_empty() {
            Ok(command)
        } else {
            Err(CoreError::InvalidRequest {
                description: format!("Invalid values for template '{}'", self.name),
                details: problems.join("\n"),
            })
        }
    }

    /// Turn raw command output into the text shown to the user.
    pub fn interpret(&self, output: &str) -> Result<String, CoreError> {
        let mut shown = match self.output_match_regex.as_deref().filter(|p| !p.is_empty()) {
            Some(pattern) => {
                if compile(pattern)?.is_match(output) {
                    self.output_match_text.clone().unwrap_or_else(|| "OK!".into())
                } else {
                    self.output_fail_text.clone().unwrap_or_else(|| "FAIL!".into())
                }
            }
            None => output.to_owned(),
        };

        if let Some(pattern) = self.output_lines_keep_regex.as_deref().filter(|p| !p.is_empty()) {
            let keep = compile(pattern)?;
            let lines: Vec<&str> = output.lines().filter(|l| keep.is_match(l)).collect();
            if !lines.is_empty() {
                shown.push_str("\nPartial output:\n");
                shown.push_str(&lines.join("\n"));
            }
        }
        Ok(shown)
    }
}

/// All command definitions and templates, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    commands: BTreeMap<u32, CommandDefinition>,
    templates: BTreeMap<u32, CommandTemplate>,
}

impl CommandCatalog {
    pub fn new(
        commands: impl IntoIterator<Item = CommandDefinition>,
        templates: impl IntoIterator<Item = CommandTemplate>,
    ) -> Self {
        Self {
            commands: commands.into_iter().map(|c| (c.id, c)).collect(),
            templates: templates.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    pub fn command(&self, id: u32) -> Result<&CommandDefinition, CoreError> {
        self.commands.get(&id).ok_or_else(|| CoreError::CommandNotFound {
            identifier: id.to_string(),
        })
    }

    pub fn template(&self, id: u32) -> Result<&CommandTemplate, CoreError> {
        self.templates.get(&id).ok_or_else(|| CoreError::CommandNotFound {
            identifier: format!("template {id}"),
        })
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.values()
    }

    pub fn templates(&self) -> impl Iterator<Item = &CommandTemplate> {
        self.templates.values()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ping_template() -> CommandTemplate {
        CommandTemplate {
            id: 1,
            name: "ping".into(),
            description: None,
            template: "ping {{target}} repetitions {{count}} source vlan {{vlan}}".into(),
            fields: vec![
                TemplateField {
                    name: "target".into(),
                    label: Some("Target IP".into()),
                    regex: r"\d+\.\d+\.\d+\.\d+".into(),
                },
                TemplateField {
                    name: "count".into(),
                    label: None,
                    regex: r"\d{1,2}".into(),
                },
                TemplateField {
                    name: "unused".into(),
                    label: None,
                    regex: ".*".into(),
                },
            ],
            lists: vec![TemplateList {
                name: "vlan".into(),
                label: None,
                choices: vec!["10".into(), "20".into()],
            }],
            output_match_regex: Some(r"Success rate is 100 percent".into()),
            output_match_text: Some("Host is reachable".into()),
            output_fail_text: None,
            output_lines_keep_regex: Some("^Success".into()),
        }
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn template_expands_valid_values() {
        let cmd = ping_template()
            .render(&values(&[("target", "10.0.0.1"), ("count", "5"), ("vlan", "20")]))
            .unwrap();
        assert_eq!(cmd, "ping 10.0.0.1 repetitions 5 source vlan 20");
    }

    #[test]
    fn template_reports_every_problem() {
        let err = ping_template()
            .render(&values(&[("target", "10.0.0.1; reload"), ("vlan", "99")]))
            .unwrap_err();
        assert_eq!(
            err.details(),
            "Target IP - Invalid entry: 10.0.0.1; reload\ncount - cannot be blank!\nvlan - Invalid entry: 99"
        );
    }

    #[test]
    fn output_is_matched_and_filtered() {
        let t = ping_template();
        let ok = t
            .interpret("Sending 5 pings\n!!!!!\nSuccess rate is 100 percent (5/5)")
            .unwrap();
        assert_eq!(
            ok,
            "Host is reachable\nPartial output:\nSuccess rate is 100 percent (5/5)"
        );
        let fail = t.interpret("Sending 5 pings\n.....\nSuccess rate is 0 percent").unwrap();
        assert!(fail.starts_with("FAIL!"));
    }

    #[test]
    fn interface_command_needs_an_interface() {
        let def = CommandDefinition {
            id: 3,
            name: "show counters".into(),
            description: None,
            kind: CommandKind::Interface,
            command: "show interface {interface} counters".into(),
        };
        assert_eq!(
            def.render(Some("Gi1/0/4")).unwrap(),
            "show interface Gi1/0/4 counters"
        );
        assert!(def.render(None).is_err());

        let catalog = CommandCatalog::new([def], Vec::<CommandTemplate>::new());
        assert!(catalog.command(3).is_ok());
        assert!(matches!(
            catalog.command(4),
            Err(CoreError::CommandNotFound { .. })
        ));
    }
}
