/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders in raw config text.
///
/// Unset variables without a fallback are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_env_with(input, |name| std::env::var(name).ok())
}

fn substitute_env_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            // Unterminated placeholder: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => {
                out.push_str("${");
                out.push_str(body);
                out.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "CARTLIST_TEST_TOKEN" => Some("s3cret".to_string()),
            _ => None,
        }
    }

    #[rstest]
    #[case("token = \"${CARTLIST_TEST_TOKEN}\"", "token = \"s3cret\"")]
    #[case("${CARTLIST_MISSING}", "${CARTLIST_MISSING}")]
    #[case("${CARTLIST_MISSING:-data.json}", "data.json")]
    #[case("${CARTLIST_TEST_TOKEN:-unused}", "s3cret")]
    #[case("${}", "${}")]
    #[case("tail ${UNCLOSED", "tail ${UNCLOSED")]
    #[case("plain text", "plain text")]
    fn substitution(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_env_with(input, lookup), expected);
    }

    #[test]
    fn multiple_placeholders_on_one_line() {
        assert_eq!(
            substitute_env_with("${CARTLIST_TEST_TOKEN}/${X:-y}", lookup),
            "s3cret/y"
        );
    }
}
