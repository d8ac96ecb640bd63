//! Documentation enrichment.
//!
//! After analysis, diagnostics without a code example get one attached from
//! a catalog of canned discord.js snippets. The lookup runs in two steps:
//!
//! 1. [`examples_for`] selects the catalog entries whose keywords occur in
//!    the concatenated diagnostic text. This step may also run remotely,
//!    see [`remote`].
//! 2. [`enrich`] picks one of the selected entries for each diagnostic.
//!
//! Matching in step 2 is a loose heuristic. A candidate matches when the
//! diagnostic text contains the candidate's key, or when the candidate's
//! own text contains the first word of the diagnostic. When nothing
//! matches, the first candidate is used anyway, so an unrelated example
//! can be attached. Existing snippets are never replaced.

pub mod remote;

use lazy_static::lazy_static;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::detect::Diagnostic;

pub use remote::{DocsError, DocsSource, RemoteDocs};

/// A canned example with a link to the reference documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEntry {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code_snippet: String,
    #[serde(default)]
    pub doc_link: String,
}

impl DocEntry {
    /// Lowercased title, description and example, used for matching.
    fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.code_snippet).to_lowercase()
    }
}

/// Keyed examples in insertion order. Serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocExamples {
    entries: Vec<(String, DocEntry)>,
}

impl DocExamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry; replacements keep their position.
    pub fn insert(&mut self, key: impl Into<String>, entry: DocEntry) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((key, entry)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&DocEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn first(&self) -> Option<(&str, &DocEntry)> {
        self.entries.first().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for DocExamples {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DocExamples {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ExamplesVisitor;

        impl<'de> Visitor<'de> for ExamplesVisitor {
            type Value = DocExamples;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of documentation examples")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut examples = DocExamples::new();
                while let Some((key, entry)) = access.next_entry::<String, DocEntry>()? {
                    examples.insert(key, entry);
                }
                Ok(examples)
            }
        }

        deserializer.deserialize_map(ExamplesVisitor)
    }
}

struct CatalogItem {
    key: &'static str,
    keywords: &'static [&'static str],
    entry: DocEntry,
}

fn item(
    key: &'static str,
    keywords: &'static [&'static str],
    title: &str,
    description: &str,
    code_snippet: &str,
    doc_link: &str,
) -> CatalogItem {
    CatalogItem {
        key,
        keywords,
        entry: DocEntry {
            title: title.to_string(),
            description: description.to_string(),
            code_snippet: code_snippet.to_string(),
            doc_link: doc_link.to_string(),
        },
    }
}

lazy_static! {
    static ref CATALOG: Vec<CatalogItem> = vec![
        item(
            "modal-builder",
            &["modal", "textinput", "showmodal"],
            "Showing a modal",
            "Modals collect text input; each TextInputBuilder sits in its own action row.",
            "const modal = new ModalBuilder()\n  .setCustomId('feedback')\n  .setTitle('Feedback');\nconst input = new TextInputBuilder()\n  .setCustomId('text')\n  .setLabel('Your feedback')\n  .setStyle(TextInputStyle.Paragraph);\nmodal.addComponents(new ActionRowBuilder().addComponents(input));\nawait interaction.showModal(modal);",
            "https://discordjs.guide/interactions/modals.html",
        ),
        item(
            "button-builder",
            &["button"],
            "Sending buttons",
            "Buttons need a style and a custom id (or a URL for link buttons) and must be wrapped in an action row.",
            "const confirm = new ButtonBuilder()\n  .setCustomId('confirm')\n  .setLabel('Confirm')\n  .setStyle(ButtonStyle.Danger);\nconst row = new ActionRowBuilder().addComponents(confirm);\nawait interaction.reply({ content: 'Are you sure?', components: [row] });",
            "https://discordjs.guide/message-components/buttons.html",
        ),
        item(
            "select-menu",
            &["select menu", "selectmenu"],
            "Select menus",
            "Select menus need a custom id and at least one option.",
            "const select = new StringSelectMenuBuilder()\n  .setCustomId('starter')\n  .setPlaceholder('Make a selection!')\n  .addOptions(\n    new StringSelectMenuOptionBuilder().setLabel('Bulbasaur').setValue('bulbasaur'),\n  );\nconst row = new ActionRowBuilder().addComponents(select);",
            "https://discordjs.guide/message-components/select-menus.html",
        ),
        item(
            "action-row",
            &["action row", "actionrow"],
            "Action rows",
            "Every message component must be placed inside an action row, up to five rows per message.",
            "const row = new ActionRowBuilder().addComponents(button);\nawait channel.send({ components: [row] });",
            "https://discordjs.guide/message-components/action-rows.html",
        ),
        item(
            "slash-command",
            &["slash command", "slashcommand"],
            "Defining a slash command",
            "Slash commands need a name and a description before they can be registered.",
            "const data = new SlashCommandBuilder()\n  .setName('ping')\n  .setDescription('Replies with Pong!');\n\nmodule.exports = {\n  data,\n  async execute(interaction) {\n    await interaction.reply('Pong!');\n  },\n};",
            "https://discordjs.guide/creating-your-bot/slash-commands.html",
        ),
        item(
            "embed-builder",
            &["embed"],
            "Embeds",
            "Embeds need at least a title, description, field, author, image or footer.",
            "const embed = new EmbedBuilder()\n  .setColor(0x0099ff)\n  .setTitle('Some title')\n  .setDescription('Some description here');\nawait channel.send({ embeds: [embed] });",
            "https://discordjs.guide/popular-topics/embeds.html",
        ),
        item(
            "gateway-intents",
            &["intent"],
            "Gateway intents",
            "Intents select which events Discord sends; privileged intents also need enabling in the Developer Portal.",
            "const client = new Client({\n  intents: [\n    GatewayIntentBits.Guilds,\n    GatewayIntentBits.GuildMessages,\n    GatewayIntentBits.MessageContent,\n  ],\n});",
            "https://discordjs.guide/popular-topics/intents.html",
        ),
        item(
            "defer-reply",
            &["defer", "long-running", "unknown interaction"],
            "Deferred responses",
            "Acknowledge slow interactions within three seconds, then edit the reply.",
            "await interaction.deferReply();\nconst result = await slowOperation();\nawait interaction.editReply(result);",
            "https://discordjs.guide/slash-commands/response-methods.html#deferred-responses",
        ),
        item(
            "interaction-replies",
            &["already been sent", "alreadyreplied", "notreplied", "followup"],
            "Replying more than once",
            "Use followUp or editReply after the first response.",
            "await interaction.reply('First');\nawait interaction.followUp('Second');\nawait interaction.editReply('First, edited');",
            "https://discordjs.guide/slash-commands/response-methods.html",
        ),
        item(
            "error-handling",
            &["error handling", "unhandled", "catch"],
            "Handling errors",
            "Catch rejected API calls and listen for client errors so one failure does not crash the bot.",
            "try {\n  await interaction.reply('Done');\n} catch (error) {\n  console.error(error);\n}\n\nclient.on(Events.Error, console.error);\nprocess.on('unhandledRejection', console.error);",
            "https://discordjs.guide/popular-topics/errors.html",
        ),
        item(
            "permissions",
            &["permission"],
            "Checking permissions",
            "Check member and bot permissions before moderation actions.",
            "if (!interaction.memberPermissions.has(PermissionFlagsBits.KickMembers)) {\n  return interaction.reply({ content: 'Missing permission.', ephemeral: true });\n}",
            "https://discordjs.guide/popular-topics/permissions.html",
        ),
        item(
            "ready-event",
            &["ready", "client.user"],
            "The ready event",
            "client.user and client.application are only available after the ready event.",
            "client.once(Events.ClientReady, (c) => {\n  console.log(`Ready! Logged in as ${c.user.tag}`);\n});",
            "https://discordjs.guide/creating-your-bot/main-file.html",
        ),
        item(
            "message-events",
            &["messagecreate", "'message' event", "interactioncreate"],
            "Event names in v14",
            "v14 renamed message to messageCreate and interaction to interactionCreate.",
            "client.on(Events.MessageCreate, async (message) => {\n  if (message.author.bot) return;\n});",
            "https://discordjs.guide/additional-info/changes-in-v14.html",
        ),
        item(
            "cache-first",
            &["cache", "fetch"],
            "Using the cache",
            "Cached structures avoid an API request; fetch only on a miss.",
            "const channel = client.channels.cache.get(id) ?? await client.channels.fetch(id);",
            "https://discordjs.guide/popular-topics/faq.html",
        ),
        item(
            "bot-token",
            &["token"],
            "Keeping the token secret",
            "Load the bot token from the environment instead of source code.",
            "require('dotenv').config();\nclient.login(process.env.DISCORD_TOKEN);",
            "https://discordjs.guide/creating-your-bot/#using-config-json",
        ),
    ];
}

/// Examples whose keywords occur in `text`, in catalog order.
pub fn examples_for(text: &str) -> DocExamples {
    let text = text.to_lowercase();
    let mut examples = DocExamples::new();
    for item in CATALOG.iter() {
        if item.keywords.iter().any(|kw| text.contains(kw)) {
            examples.insert(item.key, item.entry.clone());
        }
    }
    examples
}

/// Concatenate message and details of every diagnostic for a lookup.
pub fn diagnostics_text(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| match &d.details {
            Some(details) => format!("{} {}", d.message, details),
            None => d.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Attach an example to every diagnostic that lacks one.
///
/// Returns the number of diagnostics updated. Order and existing snippets
/// are left untouched.
pub fn enrich(diagnostics: &mut [Diagnostic], examples: &DocExamples) -> usize {
    let Some((_, fallback)) = examples.first() else {
        return 0;
    };

    let mut updated = 0;
    for diagnostic in diagnostics.iter_mut() {
        if diagnostic.code_snippet.is_some() {
            continue;
        }

        let text = format!(
            "{} {}",
            diagnostic.message,
            diagnostic.details.as_deref().unwrap_or("")
        )
        .to_lowercase();
        let first_word = text.split_whitespace().next().unwrap_or("");

        let chosen = examples
            .iter()
            .find(|(key, entry)| {
                text.contains(key) || (!first_word.is_empty() && entry.haystack().contains(first_word))
            })
            .map(|(_, entry)| entry)
            .unwrap_or(fallback);

        diagnostic.code_snippet = Some(chosen.code_snippet.clone());
        if diagnostic.doc_link.is_none() && !chosen.doc_link.is_empty() {
            diagnostic.doc_link = Some(chosen.doc_link.clone());
        }
        updated += 1;
    }
    updated
}

/// Run both enrichment steps against the built-in catalog.
pub fn enrich_local(diagnostics: &mut [Diagnostic]) -> usize {
    let examples = examples_for(&diagnostics_text(diagnostics));
    enrich(diagnostics, &examples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_for_modal() {
        let examples = examples_for("The modal is missing a title");
        assert!(examples.contains_key("modal-builder"));
        assert!(!examples.contains_key("button-builder"));
    }

    #[test]
    fn test_examples_for_is_case_insensitive_and_ordered() {
        let examples = examples_for("ButtonBuilder is missing setStyle(). Missing MessageContent intent");
        let keys: Vec<_> = examples.keys().collect();
        assert_eq!(keys, vec!["button-builder", "gateway-intents"]);
    }

    #[test]
    fn test_examples_for_nothing() {
        assert!(examples_for("").is_empty());
        assert!(examples_for("zzz").is_empty());
    }

    #[test]
    fn test_enrich_fills_missing_and_keeps_existing() {
        let examples = examples_for("modal");
        let modal = examples.get("modal-builder").unwrap().clone();

        let mut diags = vec![
            Diagnostic::warning("Modal is missing setTitle()"),
            Diagnostic::warning("Already illustrated").with_snippet("keep me"),
        ];
        let updated = enrich(&mut diags, &examples);

        assert_eq!(updated, 1);
        assert_eq!(diags[0].code_snippet.as_deref(), Some(modal.code_snippet.as_str()));
        assert_eq!(diags[0].doc_link.as_deref(), Some(modal.doc_link.as_str()));
        assert_eq!(diags[1].code_snippet.as_deref(), Some("keep me"));
        assert_eq!(diags[1].message, "Already illustrated");
    }

    #[test]
    fn test_enrich_matches_key_in_text() {
        let mut examples = DocExamples::new();
        examples.insert("first", DocEntry {
            title: "First".into(),
            description: String::new(),
            code_snippet: "first()".into(),
            doc_link: String::new(),
        });
        examples.insert("embed-builder", DocEntry {
            title: "Embeds".into(),
            description: String::new(),
            code_snippet: "embed()".into(),
            doc_link: "https://embeds".into(),
        });

        let mut diags = vec![Diagnostic::info("see embed-builder docs")];
        enrich(&mut diags, &examples);
        assert_eq!(diags[0].code_snippet.as_deref(), Some("embed()"));
    }

    #[test]
    fn test_enrich_falls_back_to_first_entry() {
        let examples = examples_for("button and intents");
        let mut diags = vec![Diagnostic::info("zzz unrelated")];
        enrich(&mut diags, &examples);

        let first = examples.first().unwrap().1;
        assert_eq!(diags[0].code_snippet.as_deref(), Some(first.code_snippet.as_str()));
    }

    #[test]
    fn test_enrich_keeps_existing_doc_link() {
        let examples = examples_for("embed");
        let mut diags = vec![Diagnostic::warning("Embed empty").with_doc_link("https://mine")];
        enrich(&mut diags, &examples);
        assert!(diags[0].code_snippet.is_some());
        assert_eq!(diags[0].doc_link.as_deref(), Some("https://mine"));
    }

    #[test]
    fn test_enrich_with_no_examples_changes_nothing() {
        let mut diags = vec![Diagnostic::warning("x")];
        let before = diags.clone();
        assert_eq!(enrich(&mut diags, &DocExamples::new()), 0);
        assert_eq!(diags, before);
    }

    #[test]
    fn test_examples_serialize_as_ordered_object() {
        let examples = examples_for("intent button");
        let json = serde_json::to_string(&examples).unwrap();
        assert!(json.starts_with("{\"button-builder\":"));

        let back: DocExamples = serde_json::from_str(&json).unwrap();
        assert_eq!(back, examples);
    }

    #[test]
    fn test_diagnostics_text() {
        let diags = vec![
            Diagnostic::warning("One").with_details("first"),
            Diagnostic::warning("Two"),
        ];
        assert_eq!(diagnostics_text(&diags), "One first\nTwo");
    }
}
