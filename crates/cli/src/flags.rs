//! Provider-specific command-line flags.
//!
//! Responsibilities:
//! - Turn a provider's `ConfigurationSet` into clap arguments (long name,
//!   short alias, help text, bool flags).
//! - Parse the arguments captured after the provider name and copy the
//!   values the user typed back into the set.
//!
//! Does NOT handle:
//! - Environment variables or defaults; callers run `apply_default_env`
//!   after [`apply_matches`] so flags take precedence.
//!
//! Invariants:
//! - Only values whose source is the command line are copied; clap defaults
//!   never mask environment values.
//! - A long name or short alias is declared at most once per command. When
//!   several sets declare the same item, the first declaration wins.

use std::collections::HashSet;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use kconnect_config::{
    ConfigError, ConfigItemType, ConfigValue, ConfigurationItem, ConfigurationSet,
};

/// Builder for the second-phase command of `auth` and `use`.
pub struct ProviderCommand {
    command: Command,
    longs: HashSet<String>,
    shorts: HashSet<char>,
}

impl ProviderCommand {
    /// Start a command whose usage line reads `bin_name`.
    pub fn new(bin_name: impl Into<String>) -> Self {
        let bin_name = bin_name.into();
        Self {
            command: Command::new(bin_name.clone())
                .bin_name(bin_name)
                .no_binary_name(true)
                .disable_version_flag(true),
            longs: HashSet::new(),
            shorts: HashSet::new(),
        }
    }

    /// Add a fixed argument. Its long name and short alias are reserved.
    pub fn arg(mut self, arg: Arg) -> Self {
        if let Some(long) = arg.get_long() {
            self.longs.insert(long.to_string());
        }
        if let Some(short) = arg.get_short() {
            self.shorts.insert(short);
        }
        self.command = self.command.arg(arg);
        self
    }

    /// Add one argument per item of `cs` under `heading`.
    pub fn items(mut self, cs: &ConfigurationSet, heading: &'static str) -> Self {
        for item in cs.items() {
            if !self.longs.insert(item.name().to_string()) {
                continue;
            }
            let mut arg = item_arg(item).help_heading(heading);
            if let Some(short) = item.short()
                && self.shorts.insert(short)
            {
                arg = arg.short(short);
            }
            self.command = self.command.arg(arg);
        }
        self
    }

    /// Parse `args`, which exclude the binary and provider names.
    pub fn try_parse(self, args: &[String]) -> Result<ArgMatches, clap::Error> {
        self.command.try_get_matches_from(args)
    }
}

fn help_text(item: &ConfigurationItem) -> String {
    let mut help = item.description().to_string();
    if item.is_required() {
        help.push_str(" (required)");
    }
    if !item.is_sensitive()
        && item.item_type() != ConfigItemType::Bool
        && let Some(default) = item.default_value()
        && !default.to_string().is_empty()
    {
        help.push_str(&format!(" [default: {default}]"));
    }
    help
}

fn item_arg(item: &ConfigurationItem) -> Arg {
    let arg = Arg::new(item.name().to_string())
        .long(item.name().to_string())
        .help(help_text(item));

    match item.item_type() {
        ConfigItemType::Bool => arg.action(ArgAction::SetTrue),
        ConfigItemType::Int => arg
            .action(ArgAction::Set)
            .value_name("INT")
            .allow_negative_numbers(true),
        ConfigItemType::String => arg.action(ArgAction::Set).value_name("VALUE"),
    }
}

/// Copy values typed on the command line into `cs`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when a value does not parse as the
/// item's type.
pub fn apply_matches(cs: &mut ConfigurationSet, matches: &ArgMatches) -> Result<(), ConfigError> {
    let items: Vec<(String, ConfigItemType)> = cs
        .items()
        .map(|item| (item.name().to_string(), item.item_type()))
        .collect();

    for (name, item_type) in items {
        if !matches.try_contains_id(&name).unwrap_or(false)
            || matches.value_source(&name) != Some(ValueSource::CommandLine)
        {
            continue;
        }

        match item_type {
            ConfigItemType::Bool => {
                if matches.get_flag(&name) {
                    cs.set_value(&name, ConfigValue::Bool(true))?;
                }
            }
            ConfigItemType::String | ConfigItemType::Int => {
                if let Some(raw) = matches.get_one::<String>(&name) {
                    cs.set_value_str(&name, raw)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> ConfigurationSet {
        let mut cs = ConfigurationSet::new();
        cs.string("tenant-id", "", "The tenant").unwrap();
        cs.string("aad-host", "login.microsoftonline.com", "The AAD host")
            .unwrap();
        cs.string("password", "", "The password").unwrap();
        cs.bool("use-device-code", false, "Use device code").unwrap();
        cs.int("credential-lifetime", 3600, "Lifetime").unwrap();
        cs.set_required("tenant-id").unwrap();
        cs.set_short("tenant-id", 't').unwrap();
        cs.set_sensitive("password").unwrap();
        cs
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flags_populate_set() {
        let mut cs = sample_set();
        let matches = ProviderCommand::new("kconnect auth test")
            .items(&cs, "Provider options")
            .try_parse(&args(&[
                "-t",
                "contoso",
                "--use-device-code",
                "--credential-lifetime",
                "900",
            ]))
            .unwrap();

        apply_matches(&mut cs, &matches).unwrap();

        assert_eq!(cs.string_value("tenant-id").unwrap().as_deref(), Some("contoso"));
        assert_eq!(cs.bool_value("use-device-code").unwrap(), Some(true));
        assert_eq!(cs.int_value("credential-lifetime").unwrap(), Some(900));
        assert!(!cs.get("aad-host").unwrap().has_value());
    }

    #[test]
    fn test_unset_bool_flag_leaves_item_unset() {
        let mut cs = sample_set();
        let matches = ProviderCommand::new("kconnect auth test")
            .items(&cs, "Provider options")
            .try_parse(&args(&["--tenant-id", "contoso"]))
            .unwrap();

        apply_matches(&mut cs, &matches).unwrap();
        assert!(!cs.get("use-device-code").unwrap().has_value());
    }

    #[test]
    fn test_bad_int_is_invalid_value() {
        let mut cs = sample_set();
        let matches = ProviderCommand::new("kconnect auth test")
            .items(&cs, "Provider options")
            .try_parse(&args(&["--credential-lifetime", "soon"]))
            .unwrap();

        let err = apply_matches(&mut cs, &matches).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let cs = sample_set();
        let err = ProviderCommand::new("kconnect auth test")
            .items(&cs, "Provider options")
            .try_parse(&args(&["--tenant", "contoso"]))
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_duplicate_items_declared_once() {
        let first = sample_set();
        let mut second = ConfigurationSet::new();
        second.string("tenant-id", "", "Another tenant").unwrap();
        second.set_short("tenant-id", 't').unwrap();
        second.string("region", "", "Region").unwrap();
        second.set_short("region", 't').unwrap_err();

        let matches = ProviderCommand::new("kconnect use test")
            .items(&first, "Discovery options")
            .items(&second, "Identity options")
            .try_parse(&args(&["-t", "contoso", "--region", "eu-west-1"]))
            .unwrap();

        let mut target = second;
        apply_matches(&mut target, &matches).unwrap();
        assert_eq!(target.string_value("tenant-id").unwrap().as_deref(), Some("contoso"));
        assert_eq!(target.string_value("region").unwrap().as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_help_text_hides_sensitive_defaults() {
        let cs = sample_set();
        assert_eq!(
            help_text(cs.get("aad-host").unwrap()),
            "The AAD host [default: login.microsoftonline.com]"
        );
        assert_eq!(help_text(cs.get("tenant-id").unwrap()), "The tenant (required)");
        assert_eq!(help_text(cs.get("password").unwrap()), "The password");
    }
}
