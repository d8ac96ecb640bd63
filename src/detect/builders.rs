//! Builder setup checks.
//!
//! discord.js builders validate lazily: a `ButtonBuilder` without a style
//! only fails when the message is sent. These rules look for a builder
//! construction and then for the setter calls it needs anywhere in the file.
//!
//! Known false negative: setters are matched file-wide, so a `setCustomId`
//! on a modal also satisfies a button declared elsewhere in the file.

use std::sync::Arc;

use crate::metadata::MetadataTable;

use super::lines::find_line;
use super::{Detector, Diagnostic, Severity};

const BUILDERS_GUIDE: &str = "https://discordjs.guide/interactions/";

/// One required setter group: at least one of `methods` must be called.
struct Requirement {
    methods: &'static [&'static str],
    severity: Severity,
}

struct BuilderRule {
    builder: &'static str,
    requirements: &'static [Requirement],
    example: &'static str,
}

static BUILDER_RULES: &[BuilderRule] = &[
    BuilderRule {
        builder: "SlashCommandBuilder",
        requirements: &[
            Requirement { methods: &["setName"], severity: Severity::Critical },
            Requirement { methods: &["setDescription"], severity: Severity::Critical },
        ],
        example: "new SlashCommandBuilder()\n  .setName('ping')\n  .setDescription('Replies with Pong!');",
    },
    BuilderRule {
        builder: "ButtonBuilder",
        requirements: &[
            Requirement { methods: &["setStyle"], severity: Severity::High },
            Requirement { methods: &["setCustomId", "setURL"], severity: Severity::High },
        ],
        example: "new ButtonBuilder()\n  .setCustomId('confirm')\n  .setLabel('Confirm')\n  .setStyle(ButtonStyle.Primary);",
    },
    BuilderRule {
        builder: "ModalBuilder",
        requirements: &[
            Requirement { methods: &["setCustomId"], severity: Severity::High },
            Requirement { methods: &["setTitle"], severity: Severity::High },
        ],
        example: "new ModalBuilder()\n  .setCustomId('feedback')\n  .setTitle('Feedback');",
    },
    BuilderRule {
        builder: "TextInputBuilder",
        requirements: &[
            Requirement { methods: &["setCustomId"], severity: Severity::High },
            Requirement { methods: &["setLabel"], severity: Severity::High },
            Requirement { methods: &["setStyle"], severity: Severity::High },
        ],
        example: "new TextInputBuilder()\n  .setCustomId('reason')\n  .setLabel('Reason')\n  .setStyle(TextInputStyle.Short);",
    },
    BuilderRule {
        builder: "StringSelectMenuBuilder",
        requirements: &[
            Requirement { methods: &["setCustomId"], severity: Severity::High },
            Requirement { methods: &["addOptions", "setOptions"], severity: Severity::High },
        ],
        example: "new StringSelectMenuBuilder()\n  .setCustomId('color')\n  .addOptions({ label: 'Red', value: 'red' });",
    },
    BuilderRule {
        builder: "EmbedBuilder",
        requirements: &[Requirement {
            methods: &[
                "setTitle",
                "setDescription",
                "addFields",
                "setFields",
                "setAuthor",
                "setImage",
                "setThumbnail",
                "setFooter",
            ],
            severity: Severity::Medium,
        }],
        example: "new EmbedBuilder()\n  .setTitle('Status')\n  .setDescription('All systems go');",
    },
];

/// Checks that builders get the setters Discord requires.
pub struct BuildersDetector {
    metadata: Arc<MetadataTable>,
}

impl BuildersDetector {
    pub const NAME: &'static str = "builders";

    pub fn new(metadata: Arc<MetadataTable>) -> Self {
        Self { metadata }
    }

    /// Whether a requirement applies to the installed library.
    ///
    /// Unknown builders (empty method set) keep every requirement; a known
    /// builder keeps only requirements it actually has a method for.
    fn applies(&self, builder: &str, requirement: &Requirement) -> bool {
        let known = self.metadata.methods_for(builder);
        known.is_empty() || requirement.methods.iter().any(|m| known.contains(*m))
    }
}

impl Detector for BuildersDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let mut out = Vec::new();

        for rule in BUILDER_RULES {
            let construction = format!("new {}(", rule.builder);
            if !code.contains(&construction) {
                continue;
            }
            let line = find_line(code, &construction);

            for req in rule.requirements {
                if !self.applies(rule.builder, req) {
                    continue;
                }
                let called = req
                    .methods
                    .iter()
                    .any(|m| code.contains(&format!(".{}(", m)));
                if called {
                    continue;
                }

                let wanted = req
                    .methods
                    .iter()
                    .map(|m| format!("{}()", m))
                    .collect::<Vec<_>>()
                    .join(" or ");
                out.push(
                    Diagnostic::warning(format!("{} is missing {}", rule.builder, wanted))
                        .with_severity(req.severity)
                        .at_line(line)
                        .with_details(format!(
                            "Discord rejects a `{}` without {} when it is sent.\n\n```js\n{}\n```",
                            rule.builder, wanted, rule.example
                        ))
                        .with_doc_link(BUILDERS_GUIDE),
                );
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> BuildersDetector {
        BuildersDetector::new(Arc::new(MetadataTable::builtin().clone()))
    }

    fn messages(code: &str) -> Vec<String> {
        detector()
            .detect(code)
            .unwrap()
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_complete_slash_command() {
        let code = "const data = new SlashCommandBuilder()\n  .setName('ping')\n  .setDescription('Pong');";
        assert!(messages(code).is_empty());
    }

    #[test]
    fn test_slash_command_missing_description() {
        let code = "\nconst data = new SlashCommandBuilder().setName('ping');";
        let diags = detector().detect(code).unwrap();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "SlashCommandBuilder is missing setDescription()");
        assert_eq!(diags[0].line, Some(2));
        assert_eq!(diags[0].severity, Some(Severity::Critical));
    }

    #[test]
    fn test_button_alternatives() {
        let code = "new ButtonBuilder().setLabel('Docs').setStyle(ButtonStyle.Link).setURL('https://x')";
        assert!(messages(code).is_empty());

        let code = "new ButtonBuilder().setLabel('Go')";
        assert_eq!(
            messages(code),
            vec![
                "ButtonBuilder is missing setStyle()",
                "ButtonBuilder is missing setCustomId() or setURL()",
            ]
        );
    }

    #[test]
    fn test_empty_embed() {
        assert_eq!(
            messages("const e = new EmbedBuilder().setColor(0xff0000);"),
            vec!["EmbedBuilder is missing setTitle() or setDescription() or addFields() or setFields() or setAuthor() or setImage() or setThumbnail() or setFooter()"]
        );
        assert!(messages("new EmbedBuilder().addFields({ name: 'a', value: 'b' })").is_empty());
    }

    #[test]
    fn test_metadata_drops_unknown_methods() {
        let json = r#"{"builderMethods": {"ModalBuilder": ["setCustomId", "addComponents"]}}"#;
        let det = BuildersDetector::new(Arc::new(MetadataTable::from_json(json).unwrap()));
        let diags = det.detect("new ModalBuilder()").unwrap();

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "ModalBuilder is missing setCustomId()");
    }

    #[test]
    fn test_unknown_builder_keeps_rules() {
        let det = BuildersDetector::new(Arc::new(MetadataTable::default()));
        assert_eq!(det.detect("new ModalBuilder()").unwrap().len(), 2);
    }

    #[test]
    fn test_no_builders() {
        assert!(messages("").is_empty());
        assert!(messages("const x = ButtonBuilder;").is_empty());
    }
}
