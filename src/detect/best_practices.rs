//! Best-practice heuristics for discord.js bots.
//!
//! Each check is an independent text test over the whole file and produces
//! at most one diagnostic (component and class checks produce one per name).
//! The checks are deliberately shallow: they look for the presence or
//! absence of substrings, not for the code structure around them.
//!
//! # Known edge cases
//! - Error handling counts as present when `catch` or `error` appears
//!   anywhere in the file, including `console.error` in unrelated code.
//! - A component builder imported on the same line as `ActionRowBuilder`
//!   is always considered wrapped.
//! - Cache checks and permission checks are file-wide, not per call site.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::metadata::MetadataTable;

use super::lines::{contains_word, find_line, find_line_matching, find_word_line, window_contains};
use super::{Detector, Diagnostic, Severity};

/// Lines searched on each side of a component for its action row.
const CONTAINER_RADIUS: usize = 10;

/// Used when the metadata table lists no component builders.
const DEFAULT_COMPONENT_BUILDERS: &[&str] = &[
    "ButtonBuilder",
    "ChannelSelectMenuBuilder",
    "MentionableSelectMenuBuilder",
    "RoleSelectMenuBuilder",
    "StringSelectMenuBuilder",
    "TextInputBuilder",
    "UserSelectMenuBuilder",
];

/// v13 classes removed in v14, with their replacements.
const REMOVED_CLASSES: &[(&str, &str)] = &[
    ("MessageEmbed", "EmbedBuilder"),
    ("MessageActionRow", "ActionRowBuilder"),
    ("MessageButton", "ButtonBuilder"),
    ("MessageSelectMenu", "StringSelectMenuBuilder"),
    ("MessageAttachment", "AttachmentBuilder"),
];

lazy_static! {
    static ref FETCH_CALL: Regex =
        Regex::new(r"\.(?:members|channels|users|roles|guilds|messages)\.fetch\(").unwrap();
    static ref CACHE_LOOKUP: Regex = Regex::new(r"\.cache\.(?:get|has|find)\(").unwrap();

    static ref MODERATION_CALL: Regex = Regex::new(
        r"\.(?:ban|kick|timeout|setNickname|bulkDelete)\(|\.roles\.(?:add|remove)\("
    ).unwrap();
    static ref PERMISSION_CHECK: Regex = Regex::new(
        r"\.permissions\.has\(|\bmemberPermissions\b|\.setDefaultMemberPermissions\(|\.permissionsFor\("
    ).unwrap();

    static ref INTERACTION_REPLY: Regex = Regex::new(r"\binteraction\.reply\(").unwrap();
    static ref LONG_OPERATION: Regex = Regex::new(
        r"\bawait\s+(?:fetch|axios|got)\b|\bsetTimeout\(|\.query\(|\bawait\s+new\s+Promise\b"
    ).unwrap();

    static ref API_CALL: Regex = Regex::new(
        r"\.(?:send|reply|followUp|editReply|deferReply|update)\("
    ).unwrap();

    static ref CLIENT_USER: Regex = Regex::new(r"\bclient\.user\b").unwrap();
    static ref READY_EVENT: Regex =
        Regex::new(r#"['"](?:ready|clientReady)['"]|\bEvents\.ClientReady\b"#).unwrap();

    static ref MESSAGE_EVENT: Regex = Regex::new(r#"\.(?:on|once)\(\s*['"]message['"]"#).unwrap();
    static ref INTERACTION_EVENT: Regex =
        Regex::new(r#"\.(?:on|once)\(\s*['"]interaction['"]"#).unwrap();

    static ref LOGIN_LITERAL: Regex =
        Regex::new(r#"\.login\(\s*['"][\w.-]{50,}['"]\s*\)"#).unwrap();
    static ref TOKEN_SHAPE: Regex =
        Regex::new(r#"['"][MNO][\w-]{23,25}\.[\w-]{6}\.[\w-]{27,}['"]"#).unwrap();
}

/// Fixed checklist of discord.js best-practice heuristics.
pub struct BestPracticesDetector {
    metadata: Arc<MetadataTable>,
}

impl BestPracticesDetector {
    pub const NAME: &'static str = "best-practices";

    pub fn new(metadata: Arc<MetadataTable>) -> Self {
        Self { metadata }
    }

    fn component_builders(&self) -> BTreeSet<String> {
        let from_metadata: BTreeSet<String> = self
            .metadata
            .component_builders()
            .iter()
            .filter(|name| !name.contains("ActionRow"))
            .cloned()
            .collect();
        if from_metadata.is_empty() {
            DEFAULT_COMPONENT_BUILDERS.iter().map(|s| s.to_string()).collect()
        } else {
            from_metadata
        }
    }

    fn check_components_outside_rows(&self, code: &str, out: &mut Vec<Diagnostic>) {
        for builder in self.component_builders() {
            let Some(line) = find_word_line(code, &builder) else {
                continue;
            };
            let wrapped = window_contains(code, line, CONTAINER_RADIUS, "ActionRowBuilder")
                || window_contains(code, line, CONTAINER_RADIUS, "addComponents(");
            if wrapped {
                continue;
            }
            out.push(
                Diagnostic::error(format!("{} is not placed in an ActionRowBuilder", builder))
                    .with_severity(Severity::High)
                    .at_line(Some(line))
                    .with_details(format!(
                        "Message components must be sent inside an action row; a bare `{}` in `components` fails with `Invalid Form Body`.\n\n```js\nconst row = new ActionRowBuilder().addComponents(component);\nawait interaction.reply({{ components: [row] }});\n```",
                        builder
                    ))
                    .with_doc_link("https://discordjs.guide/message-components/action-rows.html"),
            );
        }
    }
}

fn check_fetch_without_cache(code: &str, out: &mut Vec<Diagnostic>) {
    if !FETCH_CALL.is_match(code) || CACHE_LOOKUP.is_match(code) {
        return;
    }
    out.push(
        Diagnostic::suggestion("Fetching without checking the cache first")
            .with_severity(Severity::Low)
            .at_line(find_line_matching(code, &FETCH_CALL))
            .with_details("Every `fetch()` is an API request counted against rate limits. Try the cache first:\n\n```js\nconst member = guild.members.cache.get(id) ?? await guild.members.fetch(id);\n```")
            .with_doc_link("https://discordjs.guide/popular-topics/faq.html"),
    );
}

fn check_permission_checks(code: &str, out: &mut Vec<Diagnostic>) {
    if !MODERATION_CALL.is_match(code) || PERMISSION_CHECK.is_match(code) {
        return;
    }
    out.push(
        Diagnostic::warning("Moderation action without a permission check")
            .with_severity(Severity::High)
            .at_line(find_line_matching(code, &MODERATION_CALL))
            .with_details("Check both the invoking member and the bot before acting, or the call fails with `Missing Permissions`:\n\n```js\nif (!interaction.memberPermissions.has(PermissionFlagsBits.BanMembers)) {\n  return interaction.reply({ content: 'You cannot ban members.', ephemeral: true });\n}\nawait target.ban({ reason });\n```")
            .with_doc_link("https://discordjs.guide/popular-topics/permissions.html"),
    );
}

fn check_deferred_reply(code: &str, out: &mut Vec<Diagnostic>) {
    if !INTERACTION_REPLY.is_match(code)
        || !LONG_OPERATION.is_match(code)
        || code.contains("deferReply(")
    {
        return;
    }
    out.push(
        Diagnostic::warning("Long-running operation before replying without deferReply()")
            .with_severity(Severity::Medium)
            .at_line(find_line_matching(code, &LONG_OPERATION))
            .with_details("Interactions must be acknowledged within 3 seconds or Discord reports `Unknown Interaction`. Defer first, then edit:\n\n```js\nawait interaction.deferReply();\nconst data = await fetch(url).then((r) => r.json());\nawait interaction.editReply(`Result: ${data.value}`);\n```")
            .with_doc_link("https://discordjs.guide/slash-commands/response-methods.html#deferred-responses"),
    );
}

fn check_error_handling(code: &str, out: &mut Vec<Diagnostic>) {
    if !API_CALL.is_match(code) || code.contains("catch") || code.contains("error") {
        return;
    }
    out.push(
        Diagnostic::warning("Discord API calls without error handling")
            .with_severity(Severity::Medium)
            .at_line(find_line_matching(code, &API_CALL))
            .with_details("A rejected promise from `send()` or `reply()` becomes an unhandled rejection and can crash the process:\n\n```js\ntry {\n  await interaction.reply('Done');\n} catch (error) {\n  console.error('Reply failed:', error);\n}\n\nclient.on('error', console.error);\n```")
            .with_doc_link("https://discordjs.guide/popular-topics/errors.html"),
    );
}

fn check_ready_before_use(code: &str, out: &mut Vec<Diagnostic>) {
    let Some(user_line) = find_line_matching(code, &CLIENT_USER) else {
        return;
    };
    let used_too_early = match find_line_matching(code, &READY_EVENT) {
        Some(ready_line) => user_line < ready_line,
        None => true,
    };
    if !used_too_early {
        return;
    }
    out.push(
        Diagnostic::warning("client.user is used before the client is ready")
            .with_severity(Severity::High)
            .at_line(Some(user_line))
            .with_details("`client.user` is `null` until the ready event fires:\n\n```js\nclient.once(Events.ClientReady, (c) => {\n  console.log(`Logged in as ${c.user.tag}`);\n  c.user.setActivity('with slash commands');\n});\n```")
            .with_doc_link("https://discordjs.guide/creating-your-bot/main-file.html"),
    );
}

fn check_deprecated_events(code: &str, out: &mut Vec<Diagnostic>) {
    let events: [(&Regex, &str, &str); 2] = [
        (&*MESSAGE_EVENT, "message", "messageCreate"),
        (&*INTERACTION_EVENT, "interaction", "interactionCreate"),
    ];
    for (pattern, old, new) in events {
        if !pattern.is_match(code) {
            continue;
        }
        out.push(
            Diagnostic::warning(format!("Deprecated '{}' event", old))
                .with_severity(Severity::Medium)
                .at_line(find_line_matching(code, pattern))
                .with_details(format!(
                    "The `{}` event was removed in discord.js v14; listeners on it never fire. Use `{}`:\n\n```js\nclient.on(Events.{}, async (payload) => {{\n  // ...\n}});\n```",
                    old,
                    new,
                    capitalize(new)
                ))
                .with_doc_link("https://discordjs.guide/additional-info/changes-in-v14.html"),
        );
    }
}

fn check_removed_classes(code: &str, out: &mut Vec<Diagnostic>) {
    for (old, new) in REMOVED_CLASSES {
        if !contains_word(code, old) {
            continue;
        }
        out.push(
            Diagnostic::warning(format!("{} was removed in discord.js v14", old))
                .with_severity(Severity::Medium)
                .at_line(find_word_line(code, old))
                .with_details(format!(
                    "Replace `{}` with `{}`:\n\n```js\nconst {{ {} }} = require('discord.js');\n```",
                    old, new, new
                ))
                .with_doc_link("https://discordjs.guide/additional-info/changes-in-v14.html"),
        );
    }
}

fn check_hardcoded_token(code: &str, out: &mut Vec<Diagnostic>) {
    let pattern: &Regex = if LOGIN_LITERAL.is_match(code) {
        &*LOGIN_LITERAL
    } else if TOKEN_SHAPE.is_match(code) {
        &*TOKEN_SHAPE
    } else {
        return;
    };
    out.push(
        Diagnostic::error("Bot token is hardcoded")
            .with_severity(Severity::Critical)
            .at_line(find_line_matching(code, pattern).or_else(|| find_line(code, ".login(")))
            .with_details("Anyone who sees this code can control the bot. Regenerate the token in the Developer Portal and load it from the environment:\n\n```js\nrequire('dotenv').config();\nclient.login(process.env.DISCORD_TOKEN);\n```")
            .with_doc_link("https://discordjs.guide/creating-your-bot/#using-config-json"),
    );
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Detector for BestPracticesDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, code: &str) -> anyhow::Result<Vec<Diagnostic>> {
        let mut out = Vec::new();
        check_hardcoded_token(code, &mut out);
        check_fetch_without_cache(code, &mut out);
        check_permission_checks(code, &mut out);
        check_deferred_reply(code, &mut out);
        self.check_components_outside_rows(code, &mut out);
        check_error_handling(code, &mut out);
        check_ready_before_use(code, &mut out);
        check_deprecated_events(code, &mut out);
        check_removed_classes(code, &mut out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::DiagnosticKind;

    fn detector() -> BestPracticesDetector {
        BestPracticesDetector::new(Arc::new(MetadataTable::builtin().clone()))
    }

    fn run(code: &str) -> Vec<Diagnostic> {
        detector().detect(code).unwrap()
    }

    fn find<'a>(diags: &'a [Diagnostic], message: &str) -> Option<&'a Diagnostic> {
        diags.iter().find(|d| d.message == message)
    }

    #[test]
    fn test_empty_input() {
        assert!(run("").is_empty());
    }

    #[test]
    fn test_button_inside_row() {
        let code = r#"
const button = new ButtonBuilder()
  .setCustomId('ok')
  .setLabel('OK')
  .setStyle(ButtonStyle.Primary);
const row = new ActionRowBuilder().addComponents(button);
"#;
        let diags = run(code);
        assert!(!diags.iter().any(|d| d.message.contains("ActionRowBuilder")));
    }

    #[test]
    fn test_button_outside_row() {
        let code = "const x = 1;\nconst button = new ButtonBuilder().setCustomId('ok');\nawait channel.send({ components: [button] });";
        let diags = run(code);
        let structural: Vec<_> = diags
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Error)
            .collect();

        assert_eq!(structural.len(), 1);
        assert_eq!(
            structural[0].message,
            "ButtonBuilder is not placed in an ActionRowBuilder"
        );
        assert_eq!(structural[0].line, Some(2));
    }

    #[test]
    fn test_row_far_away_does_not_count() {
        let mut code = String::from("const button = new ButtonBuilder();\n");
        for i in 0..15 {
            code.push_str(&format!("const filler{} = {};\n", i, i));
        }
        code.push_str("const row = new ActionRowBuilder().addComponents(button);\n");

        let diags = run(&code);
        assert!(find(&diags, "ButtonBuilder is not placed in an ActionRowBuilder").is_some());
    }

    #[test]
    fn test_metadata_component_builders_used() {
        let json = r#"{"componentBuilders": ["ActionRowBuilder", "FancyBuilder"]}"#;
        let det = BestPracticesDetector::new(Arc::new(MetadataTable::from_json(json).unwrap()));
        let diags = det.detect("new FancyBuilder();\nnew ButtonBuilder();").unwrap();

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "FancyBuilder is not placed in an ActionRowBuilder");
    }

    #[test]
    fn test_fetch_without_cache() {
        let diags = run("const m = await guild.members.fetch(id);");
        let d = find(&diags, "Fetching without checking the cache first").unwrap();
        assert_eq!(d.kind, DiagnosticKind::Suggestion);
        assert_eq!(d.severity, Some(Severity::Low));

        let diags = run("const m = guild.members.cache.get(id) ?? await guild.members.fetch(id);");
        assert!(find(&diags, "Fetching without checking the cache first").is_none());
    }

    #[test]
    fn test_moderation_without_permission_check() {
        let diags = run("await target.ban({ reason });");
        assert!(find(&diags, "Moderation action without a permission check").is_some());

        let code = "if (!interaction.memberPermissions.has(PermissionFlagsBits.BanMembers)) return;\nawait target.ban();";
        let diags = run(code);
        assert!(find(&diags, "Moderation action without a permission check").is_none());
    }

    #[test]
    fn test_deferred_reply() {
        let code = "const res = await fetch(url);\nawait interaction.reply(res.statusText);";
        let diags = run(code);
        let d = find(&diags, "Long-running operation before replying without deferReply()").unwrap();
        assert_eq!(d.line, Some(1));

        let code = "await interaction.deferReply();\nconst res = await fetch(url);\nawait interaction.reply('x');";
        assert!(find(&run(code), "Long-running operation before replying without deferReply()").is_none());
    }

    #[test]
    fn test_error_handling_heuristic() {
        let diags = run("await message.reply('pong');");
        assert!(find(&diags, "Discord API calls without error handling").is_some());

        let diags = run("await message.reply('pong').catch(console.log);");
        assert!(find(&diags, "Discord API calls without error handling").is_none());

        // Any mention of "error" counts, even when unrelated.
        let diags = run("// error codes below\nawait message.reply('pong');");
        assert!(find(&diags, "Discord API calls without error handling").is_none());
    }

    #[test]
    fn test_client_user_before_ready() {
        let code = "client.user.setActivity('x');\nclient.once('ready', () => {});";
        let d = find(&run(code), "client.user is used before the client is ready")
            .cloned()
            .unwrap();
        assert_eq!(d.line, Some(1));

        let code = "client.once(Events.ClientReady, () => {\n  console.log(client.user.tag);\n});";
        assert!(find(&run(code), "client.user is used before the client is ready").is_none());
    }

    #[test]
    fn test_deprecated_events() {
        let code = "client.on('message', msg => {});\nclient.on(\"interaction\", i => {});";
        let diags = run(code);
        assert_eq!(find(&diags, "Deprecated 'message' event").unwrap().line, Some(1));
        assert_eq!(find(&diags, "Deprecated 'interaction' event").unwrap().line, Some(2));

        assert!(find(&run("client.on('messageCreate', m => {});"), "Deprecated 'message' event").is_none());
    }

    #[test]
    fn test_removed_classes() {
        let diags = run("const { MessageEmbed } = require('discord.js');\nconst e = new MessageEmbed();");
        let d = find(&diags, "MessageEmbed was removed in discord.js v14").unwrap();
        assert_eq!(d.line, Some(1));
        assert!(d.details.as_deref().unwrap().contains("EmbedBuilder"));
    }

    #[test]
    fn test_hardcoded_token() {
        let token = format!("{}.{}.{}", "M".repeat(24), "a".repeat(6), "b".repeat(27));
        let code = format!("const client = makeClient();\nclient.login('{}');", token);
        let diags = run(&code);
        let d = find(&diags, "Bot token is hardcoded").unwrap();
        assert_eq!(d.kind, DiagnosticKind::Error);
        assert_eq!(d.line, Some(2));

        assert!(find(&run("client.login(process.env.DISCORD_TOKEN);"), "Bot token is hardcoded").is_none());
    }
}
