// Parser for column-list arguments such as `Area, Mean, "Feret, max"`

use anyhow::{anyhow, Result};
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list0,
    sequence::delimited,
    IResult,
};

/// Parse a quoted column name: "Feret, max"
fn quoted_name(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), opt(is_not("\"")), char('"')),
        |s: Option<&str>| s.unwrap_or_default().to_string(),
    )(input)
}

/// Parse a bare column name; inner spaces are kept, outer ones trimmed
fn bare_name(input: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| c != ',' && c != '"'), |s: &str| {
        s.trim().to_string()
    })(input)
}

fn column_name(input: &str) -> IResult<&str, String> {
    delimited(multispace0, alt((quoted_name, bare_name)), multispace0)(input)
}

/// Parse a comma separated list of column names. An empty or blank input is
/// an empty list.
pub fn column_list(input: &str) -> IResult<&str, Vec<String>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(char(','), column_name),
        multispace0,
    ))(input)
}

pub fn parse_column_list(input: &str) -> Result<Vec<String>> {
    column_list(input)
        .map(|(_, names)| names)
        .map_err(|e| anyhow!("Invalid column list '{}': {:?}", input, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_list() {
        assert_eq!(parse_column_list("A,B").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(
            parse_column_list("  Area ,  Mean  ").unwrap(),
            vec!["Area", "Mean"]
        );
    }

    #[test]
    fn test_inner_spaces_kept() {
        assert_eq!(
            parse_column_list("Feret Angle, Min Feret").unwrap(),
            vec!["Feret Angle", "Min Feret"]
        );
    }

    #[test]
    fn test_quoted_names_with_commas() {
        assert_eq!(
            parse_column_list(r#"Area, "Feret, max", Mean"#).unwrap(),
            vec!["Area", "Feret, max", "Mean"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_column_list("").unwrap().is_empty());
        assert!(parse_column_list("   ").unwrap().is_empty());
    }

    #[test]
    fn test_trailing_comma_rejected() {
        assert!(parse_column_list("A,").is_err());
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        assert!(parse_column_list(r#""Area"#).is_err());
    }
}
