//! Gateway intent checks.
//!
//! Flags clients constructed without intents, accessors that need a
//! privileged intent the code never requests, and legacy intent syntax.
//!
//! # Flagged:
//! - `new Client({})` (no `intents` anywhere in the file)
//! - `message.content` without `MessageContent`
//! - `intents: ['GUILDS', 'GUILD_MESSAGES']`
//! - `Intents.FLAGS.GUILDS`
//! - `GatewayIntentBits.GuildMessage` (not a real flag)
//!
//! Intent warnings are suppressed when the metadata table lists intents but
//! not the one in question: the installed library has no such flag, so
//! asking for it would be wrong advice. An empty table never suppresses.

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

use crate::metadata::{MetadataTable, GATEWAY_INTENTS};

use super::lines::{find_line, find_line_matching};
use super::{Detector, Diagnostic, Severity};

const INTENTS_GUIDE: &str = "https://discordjs.guide/popular-topics/intents.html";

lazy_static! {
    static ref NEW_CLIENT: Regex = Regex::new(r"\bnew\s+(?:Discord\.)?Client\s*\(").unwrap();
    static ref INTENTS_FIELD: Regex = Regex::new(r"\bintents\b").unwrap();
    static ref INTENTS_KEY: Regex = Regex::new(r"\bintents\s*:").unwrap();
    static ref LEGACY_STRING_INTENTS: Regex =
        Regex::new(r#"\bintents\s*:\s*\[\s*['"][A-Z][A-Z_]*['"]"#).unwrap();
    static ref INTENTS_FLAGS: Regex = Regex::new(r"\bIntents\.FLAGS\b").unwrap();
    static ref INTENT_MEMBER: Regex =
        Regex::new(r"\b(?:GatewayIntentBits|IntentsBitField\.Flags)\.([A-Za-z]+)\b").unwrap();

    /// Intents whose absence silently breaks an accessor.
    static ref INTENT_RULES: Vec<IntentRule> = vec![
        IntentRule {
            intent: "MessageContent",
            aliases: &["MessageContent", "MESSAGE_CONTENT"],
            usage: Regex::new(r"(?i)\b\w*(?:message|msg)\.content\b").unwrap(),
            severity: Severity::High,
            details: "Without the privileged `MessageContent` intent, `message.content` is an empty string for messages that do not mention the bot.\n\n```js\nconst client = new Client({\n  intents: [\n    GatewayIntentBits.Guilds,\n    GatewayIntentBits.GuildMessages,\n    GatewayIntentBits.MessageContent,\n  ],\n});\n```\n\nAlso enable **Message Content Intent** in the Developer Portal.",
        },
        IntentRule {
            intent: "GuildMembers",
            aliases: &["GuildMembers", "GUILD_MEMBERS"],
            usage: Regex::new(r"\bguildMember(?:Add|Remove|Update)\b|\bGuildMember(?:Add|Remove|Update)\b|\.members\.fetch\(\s*\)").unwrap(),
            severity: Severity::High,
            details: "Member events and full member fetches require the privileged `GuildMembers` intent.\n\n```js\nconst client = new Client({\n  intents: [GatewayIntentBits.Guilds, GatewayIntentBits.GuildMembers],\n});\n```\n\nAlso enable **Server Members Intent** in the Developer Portal.",
        },
        IntentRule {
            intent: "GuildPresences",
            aliases: &["GuildPresences", "GUILD_PRESENCES"],
            usage: Regex::new(r"\bpresenceUpdate\b|\bPresenceUpdate\b|\.presence\b").unwrap(),
            severity: Severity::Medium,
            details: "Presence data is only sent with the privileged `GuildPresences` intent.\n\n```js\nconst client = new Client({\n  intents: [GatewayIntentBits.Guilds, GatewayIntentBits.GuildPresences],\n});\n```",
        },
        IntentRule {
            intent: "GuildMessages",
            aliases: &["GuildMessages", "GUILD_MESSAGES", "DirectMessages", "DIRECT_MESSAGES"],
            usage: Regex::new(r#"['"]messageCreate['"]|\bEvents\.MessageCreate\b"#).unwrap(),
            severity: Severity::High,
            details: "`messageCreate` never fires for guild messages without the `GuildMessages` intent.\n\n```js\nconst client = new Client({\n  intents: [GatewayIntentBits.Guilds, GatewayIntentBits.GuildMessages],\n});\n```",
        },
    ];
}

struct IntentRule {
    intent: &'static str,
    /// Any of these in the source counts as requesting the intent.
    aliases: &'static [&'static str],
    usage: Regex,
    severity: Severity,
    details: &'static str,
}

/// Checks client construction and gateway intent usage.
pub struct IntentsDetector {
    metadata: Arc<MetadataTable>,
}

impl IntentsDetector {
    pub const NAME: &'static str = "intents";

    pub fn new(metadata: Arc<MetadataTable>) -> Self {
        Self { metadata }
    }

    fn check_missing_intents(&self, code: &str, out: &mut Vec<Diagnostic>) {
        if !NEW_CLIENT.is_match(code) || INTENTS_FIELD.is_match(code) {
            return;
        }
        out.push(
            Diagnostic::error("Client is created without intents")
                .with_severity(Severity::Critical)
                .at_line(find_line_matching(code, &NEW_CLIENT))
                .with_details("discord.js v14 requires an `intents` option; the client throws `ClientMissingIntents` on startup.\n\n```js\nconst { Client, GatewayIntentBits } = require('discord.js');\n\nconst client = new Client({\n  intents: [GatewayIntentBits.Guilds, GatewayIntentBits.GuildMessages],\n});\n```")
                .with_doc_link(INTENTS_GUIDE),
        );
    }

    fn check_required_intents(&self, code: &str, out: &mut Vec<Diagnostic>) {
        for rule in INTENT_RULES.iter() {
            if !rule.usage.is_match(code) {
                continue;
            }
            if rule.aliases.iter().any(|a| code.contains(a)) {
                continue;
            }
            if self.metadata.suppresses(GATEWAY_INTENTS, rule.intent) {
                continue;
            }
            out.push(
                Diagnostic::warning(format!("Missing {} intent", rule.intent))
                    .with_severity(rule.severity)
                    .at_line(find_line_matching(code, &rule.usage))
                    .with_details(rule.details)
                    .with_doc_link(INTENTS_GUIDE),
            );
        }
    }

    fn check_legacy_string_intents(&self, code: &str, out: &mut Vec<Diagnostic>) {
        if !LEGACY_STRING_INTENTS.is_match(code) {
            return;
        }
        out.push(
            Diagnostic::warning("Intents use legacy string flags")
                .with_severity(Severity::Medium)
                .at_line(find_line_matching(code, &INTENTS_KEY))
                .with_details("String intent names such as `'GUILDS'` were removed in discord.js v14. Use the `GatewayIntentBits` enum:\n\n```js\nconst { GatewayIntentBits } = require('discord.js');\n\nintents: [GatewayIntentBits.Guilds, GatewayIntentBits.GuildMessages]\n```")
                .with_doc_link(INTENTS_GUIDE),
        );
    }

    fn check_intents_flags(&self, code: &str, out: &mut Vec<Diagnostic>) {
        if !INTENTS_FLAGS.is_match(code) {
            return;
        }
        out.push(
            Diagnostic::warning("Intents.FLAGS is deprecated")
                .with_severity(Severity::Medium)
                .at_line(find_line(code, "Intents.FLAGS"))
                .with_details("`Intents.FLAGS.X` is the discord.js v13 API. In v14 use `GatewayIntentBits.X`:\n\n```js\n// before\nintents: [Intents.FLAGS.GUILDS]\n// after\nintents: [GatewayIntentBits.Guilds]\n```")
                .with_doc_link(INTENTS_GUIDE),
        );
    }

    fn check_unknown_intents(&self, code: &str, out: &mut Vec<Diagnostic>) {
        let known = match self.metadata.recognized_values(GATEWAY_INTENTS) {
            Some(set) if !set.is_empty() => set,
            _ => return,
        };

        let mut reported: Vec<&str> = Vec::new();
        for caps in INTENT_MEMBER.captures_iter(code) {
            let (Some(full), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let name = name.as_str();
            if known.contains(name) || reported.contains(&name) {
                continue;
            }
            reported.push(name);
            out.push(
                Diagnostic::error(format!("Unknown gateway intent: {}", name))
                    .with_severity(Severity::High)
                    .at_line(find_line(code, full.as_str()))
                    .with_details(format!(
                        "`{}` is not a gateway intent in the installed discord.js version. Check the spelling against `GatewayIntentBits`.",
                        name
                    ))
                    .with_doc_link(INTENTS_GUIDE),
            );
        }
    }
}

impl Detector for IntentsDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let mut out = Vec::new();
        self.check_missing_intents(code, &mut out);
        self.check_required_intents(code, &mut out);
        self.check_legacy_string_intents(code, &mut out);
        self.check_intents_flags(code, &mut out);
        self.check_unknown_intents(code, &mut out);
        Ok(out)
    }
}
