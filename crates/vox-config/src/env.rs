use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional fallback is supported via `{{ env.VAR | default("value") }}`:
/// when the variable is unset the fallback is substituted instead of
/// returning an error. Comment lines are passed through untouched so that
/// commented-out placeholders never fail a load.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn re() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
                .expect("must be valid regex")
        })
    }

    let mut output = String::with_capacity(input.len());

    for (i, line) in input.lines().enumerate() {
        if i > 0 {
            output.push('\n');
        }

        if line.trim_start().starts_with('#') {
            output.push_str(line);
            continue;
        }

        let mut last_end = 0;

        for captures in re().captures_iter(line) {
            let overall = captures.get(0).unwrap();
            let key = captures.get(1).unwrap().as_str();
            let fallback = captures.get(2).map(|m| m.as_str());

            output.push_str(&line[last_end..overall.start()]);

            let Some(var_name) = key.strip_prefix("env.").filter(|rest| !rest.contains('.')) else {
                return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
            };

            match std::env::var(var_name) {
                Ok(value) => output.push_str(&value),
                Err(_) => match fallback {
                    Some(value) => output.push_str(value),
                    None => return Err(format!("environment variable not found: `{var_name}`")),
                },
            }

            last_end = overall.end();
        }

        output.push_str(&line[last_end..]);
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_placeholders() {
        let input = "key = \"value\"";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn single_env_var() {
        temp_env::with_var("VOX_TEST_VAR", Some("hello"), || {
            let result = expand_env("key = \"{{ env.VOX_TEST_VAR }}\"").unwrap();
            assert_eq!(result, "key = \"hello\"");
        });
    }

    #[test]
    fn missing_env_var() {
        temp_env::with_var_unset("VOX_MISSING_VAR", || {
            let err = expand_env("key = \"{{ env.VOX_MISSING_VAR }}\"").unwrap_err();
            assert!(err.contains("VOX_MISSING_VAR"));
        });
    }

    #[test]
    fn unsupported_scope() {
        let err = expand_env("key = \"{{ secrets.KEY }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn commented_lines_skip_expansion() {
        temp_env::with_var_unset("VOX_MISSING_VAR", || {
            let input = "# api_key = \"{{ env.VOX_MISSING_VAR }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn default_used_when_var_missing() {
        temp_env::with_var_unset("VOX_OPTIONAL_VAR", || {
            let result = expand_env("key = \"{{ env.VOX_OPTIONAL_VAR | default(\"\") }}\"").unwrap();
            assert_eq!(result, "key = \"\"");
        });
    }

    #[test]
    fn default_not_used_when_var_present() {
        temp_env::with_var("VOX_OPTIONAL_VAR", Some("actual"), || {
            let result =
                expand_env("key = \"{{ env.VOX_OPTIONAL_VAR | default(\"fallback\") }}\"").unwrap();
            assert_eq!(result, "key = \"actual\"");
        });
    }

    #[test]
    fn trailing_newline_preserved() {
        let input = "key = \"value\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }
}
