//! Curated remediation text for well-known catalog codes.

use phf::phf_map;

static REMEDIATIONS: phf::Map<&'static str, &'static str> = phf_map! {
    "InteractionAlreadyReplied" => r#"An interaction can only be replied to once. After `reply()` or `deferReply()`, use `followUp()` or `editReply()`:

```js
await interaction.deferReply();
// long work...
await interaction.editReply('Done!');
await interaction.followUp({ content: 'One more thing', ephemeral: true });
```

Check `interaction.replied` or `interaction.deferred` when several code paths may respond."#,

    "InteractionNotReplied" => r#"`editReply()`, `deleteReply()` and `fetchReply()` require an initial response. Reply or defer first:

```js
await interaction.deferReply();
await interaction.editReply('Result ready');
```"#,

    "ClientMissingIntents" => r#"Every `Client` must declare the gateway intents it needs:

```js
const { Client, GatewayIntentBits } = require('discord.js');
const client = new Client({
  intents: [GatewayIntentBits.Guilds, GatewayIntentBits.GuildMessages],
});
```"#,

    "DisallowedIntents" => r#"A privileged intent (`GuildMembers`, `GuildPresences` or `MessageContent`) was requested but is not enabled. Enable it under **Bot > Privileged Gateway Intents** in the Developer Portal, or remove it from the `intents` array."#,

    "Used disallowed intents" => r#"The gateway rejected a privileged intent. Enable it under **Bot > Privileged Gateway Intents** in the Developer Portal, or remove it from the `intents` array."#,

    "TokenInvalid" => r#"The token passed to `client.login()` was rejected. Regenerate it in the Developer Portal and load it from the environment:

```js
client.login(process.env.DISCORD_TOKEN);
```"#,

    "TokenMissing" => r#"`client.login()` was called without a token. Make sure the environment variable is set before the bot starts:

```js
require('dotenv').config();
client.login(process.env.DISCORD_TOKEN);
```"#,

    "ClientNotReady" => r#"The client is not logged in yet. Wait for the ready event before using `client.user` or `client.application`:

```js
client.once(Events.ClientReady, (c) => {
  console.log(`Logged in as ${c.user.tag}`);
});
```"#,

    "Unknown Interaction" => r#"Interactions must be acknowledged within 3 seconds. Defer slow handlers immediately:

```js
await interaction.deferReply();
const data = await slowOperation();
await interaction.editReply(data);
```"#,

    "Missing Permissions" => r#"The bot lacks a permission required for this action. Check before acting:

```js
if (!interaction.guild.members.me.permissions.has(PermissionFlagsBits.BanMembers)) {
  return interaction.reply({ content: 'I need Ban Members.', ephemeral: true });
}
```

Also verify role hierarchy: the bot's highest role must be above the target's."#,

    "Missing Access" => r#"The bot cannot see the channel or guild. Check the channel's permission overwrites for `ViewChannel` and that the bot is still in the guild."#,

    "Invalid Form Body" => r#"Discord rejected the payload shape. Common causes are an empty embed, a field value over 1024 characters, more than 5 action rows, or more than 25 choices. Log `error.rawError.errors` to see which field failed."#,

    "MessageEmptyContent" => r#"A message needs content, an embed, a file or components:

```js
await channel.send({ content: 'Hello' });
```"#,

    "CommandInteractionOptionNotFound" => r#"A required option was read but not provided. Mark the option required in the command definition, or read it with `required = false`:

```js
const reason = interaction.options.getString('reason') ?? 'No reason given';
```"#,
};

/// Curated remediation for a catalog code, if one exists.
pub fn remediation_for(code: &str) -> Option<&'static str> {
    REMEDIATIONS.get(code).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_has_remediation() {
        let text = remediation_for("InteractionAlreadyReplied").unwrap();
        assert!(text.contains("followUp"));
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(remediation_for("interactionalreadyreplied").is_none());
        assert!(remediation_for("ButtonLabel").is_none());
    }
}
