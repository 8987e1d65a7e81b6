pub const SHEBANG: &str = "#!/bin/bash";

pub const UNVERIFIED_WARNING: &str =
    "# Warning: model output did not start with #!/bin/bash. Returning raw output, review before execution.";

const FENCE_OPENERS: &[&str] = &["```bash", "```shell", "```sh", "```"];

/// Fixed script returned when the model produced nothing.
pub fn blocked_script(reason: Option<&str>) -> String {
    let mut out = String::from("# Error: model response was blocked or empty for script generation.");
    if let Some(reason) = reason {
        out.push_str("\n# Reason: ");
        out.push_str(&reason.replace('\n', " "));
    }
    out
}

/// Check a model-produced script and repair it once.
///
/// A script must start with the shebang. If it doesn't, one layer of markdown
/// fence is stripped and the check repeated. Output that still fails comes back
/// with a warning header so it cannot be mistaken for a verified script.
pub fn repair_script(raw: &str) -> Result<String, String> {
    let script = raw.trim();
    if script.starts_with(SHEBANG) {
        return Ok(script.to_string());
    }

    let unfenced = strip_fence(script);
    if unfenced.starts_with(SHEBANG) {
        return Ok(unfenced.to_string());
    }

    Err(format!("{UNVERIFIED_WARNING}\n{unfenced}"))
}

fn strip_fence(script: &str) -> &str {
    let Some(body) = FENCE_OPENERS.iter().find_map(|f| script.strip_prefix(f)) else {
        return script;
    };
    let body = body.trim();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_script_passes_through_trimmed() {
        let raw = "\n#!/bin/bash\nset -e\necho 'done'\n\n";
        assert_eq!(repair_script(raw).unwrap(), "#!/bin/bash\nset -e\necho 'done'");
    }

    #[test]
    fn strips_bash_fence() {
        let raw = "```bash\n#!/bin/bash\nset -e\n```";
        assert_eq!(repair_script(raw).unwrap(), "#!/bin/bash\nset -e");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n#!/bin/bash\nmkdir -p 'frontend'\n```";
        assert_eq!(repair_script(raw).unwrap(), "#!/bin/bash\nmkdir -p 'frontend'");
    }

    #[test]
    fn prose_gets_warning_header() {
        let raw = "Here is your script:\nmkdir -p 'a'";
        let out = repair_script(raw).unwrap_err();
        assert!(out.starts_with("# Warning:"));
        assert!(out.ends_with("Here is your script:\nmkdir -p 'a'"));
    }

    #[test]
    fn fenced_script_without_shebang_is_unfenced_then_warned() {
        let out = repair_script("```sh\nmkdir -p 'a'\n```").unwrap_err();
        assert_eq!(out, format!("{UNVERIFIED_WARNING}\nmkdir -p 'a'"));
    }

    #[test]
    fn blocked_script_is_a_comment() {
        assert_eq!(
            blocked_script(Some("SAFETY\nfilter")),
            "# Error: model response was blocked or empty for script generation.\n# Reason: SAFETY filter"
        );
        assert!(blocked_script(None).lines().all(|l| l.starts_with('#')));
    }
}
