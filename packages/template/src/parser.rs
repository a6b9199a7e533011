use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{anychar, char, digit1},
    combinator::{all_consuming, map, map_res},
    error::{context, VerboseError},
    multi::{many_till, separated_list1},
    sequence::preceded,
    IResult,
};

use crate::error::ParseError;

type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// The compiler revision stamped on an artifact, e.g. `Ember@2.6.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub major: u32,
}

struct RevisionParser;
impl RevisionParser {
    // first `Ember@<digits>` anywhere in the string
    fn major(message: &str) -> ParserResult<u32> {
        context(
            "revision",
            map(
                many_till(
                    anychar,
                    preceded(tag("Ember@"), map_res(digit1, |v: &str| v.parse::<u32>())),
                ),
                |(_, major)| major,
            ),
        )(message)
    }
}

pub fn parse_revision(revision: &str) -> Result<Revision, ParseError> {
    match RevisionParser::major(revision) {
        Ok((_, major)) => Ok(Revision { major }),
        Err(_) => Err(ParseError::InvalidRevision {
            revision: revision.to_string(),
        }),
    }
}

struct PathParser;
impl PathParser {
    fn segments(message: &str) -> ParserResult<Vec<&str>> {
        context(
            "alias path",
            all_consuming(separated_list1(char('.'), take_while1(|c: char| c != '.'))),
        )(message)
    }
}

/// Splits a dotted alias path such as `foo.bar.Ember`. An empty path has no
/// segments; an empty segment is an error.
pub fn parse_alias_path(path: &str) -> Result<Vec<String>, ParseError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    match PathParser::segments(path) {
        Ok((_, segments)) => Ok(segments.into_iter().map(str::to_string).collect()),
        Err(_) => Err(ParseError::InvalidPath {
            path: path.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_major_versions() {
        assert_eq!(parse_revision("Ember@1.12.2").map(|r| r.major), Ok(1));
        assert_eq!(parse_revision("Ember@2.6.0").map(|r| r.major), Ok(2));
        assert_eq!(parse_revision("Ember@10.0.0-beta").map(|r| r.major), Ok(10));
        assert_eq!(
            parse_revision("HTMLBars/Ember@2.3.0").map(|r| r.major),
            Ok(2)
        );
    }

    #[test]
    fn revision_skips_markers_without_digits() {
        assert_eq!(
            parse_revision("Ember@next Ember@2.6.0").map(|r| r.major),
            Ok(2)
        );
        assert_eq!(parse_revision("Ember@canary/Ember@1.13.0").map(|r| r.major), Ok(1));
    }

    #[test]
    fn revision_without_marker() {
        assert_eq!(
            parse_revision("Glimmer@0.1"),
            Err(ParseError::InvalidRevision {
                revision: "Glimmer@0.1".to_string()
            })
        );
        assert!(parse_revision("Ember@").is_err());
        assert!(parse_revision("Ember@next").is_err());
        assert!(parse_revision("").is_err());
    }

    #[test]
    fn alias_paths() {
        assert_eq!(parse_alias_path(""), Ok(vec![]));
        assert_eq!(parse_alias_path("Ember"), Ok(vec!["Ember".to_string()]));
        assert_eq!(
            parse_alias_path("foo.bar.Ember"),
            Ok(vec!["foo".to_string(), "bar".to_string(), "Ember".to_string()])
        );
        assert!(matches!(
            parse_alias_path("foo..Ember"),
            Err(ParseError::InvalidPath { .. })
        ));
        assert!(parse_alias_path(".Ember").is_err());
        assert!(parse_alias_path("Ember.").is_err());
    }
}
