//! Participant declaration grammar
//!
//! Recognizes `participant <name> as <alias> [#<color>]` with chumsky. The
//! name is either a double-quoted label or a single run of non-whitespace;
//! alias and color are runs of word characters. Anything after the alias (or
//! color) is ignored, so `participant A as B order 10` still declares `B`.

use chumsky::prelude::*;

use crate::core::Participant;

/// Fields of a recognized declaration, borrowed from the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'src> {
    pub name: &'src str,
    pub alias: &'src str,
    pub color: Option<&'src str>,
}

/// One or more whitespace characters
fn spacing<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    any()
        .filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .ignored()
}

/// One or more word characters (alphanumeric or underscore)
fn word<'src>() -> impl Parser<'src, &'src str, &'src str> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
}

/// `as <alias> [#<color>]`, everything after the name token
fn alias_and_color<'src>() -> impl Parser<'src, &'src str, (&'src str, Option<&'src str>)> + Clone
{
    let color = spacing()
        .ignore_then(just('#'))
        .ignore_then(word())
        .or_not();

    just("as")
        .ignore_then(spacing())
        .ignore_then(word())
        .then(color)
}

fn declaration_parser<'src>() -> impl Parser<'src, &'src str, Declaration<'src>> {
    let quoted = just('"')
        .ignore_then(none_of('"').repeated().at_least(1).to_slice())
        .then_ignore(just('"'));

    let bare = any()
        .filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .to_slice();

    // Each name form carries its own tail so a quoted name that is not
    // followed by `as` can still be retried as a bare token.
    let quoted_form = quoted
        .then_ignore(spacing())
        .then(alias_and_color());
    let bare_form = bare.then_ignore(spacing()).then(alias_and_color());

    just("participant")
        .ignore_then(spacing())
        .ignore_then(quoted_form.or(bare_form))
        .then_ignore(any().repeated())
        .then_ignore(end())
        .map(|(name, (alias, color))| Declaration { name, alias, color })
}

/// Match a declaration, allowing leading whitespace before `participant`
pub fn match_declaration(line: &str) -> Option<Declaration<'_>> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with("participant") {
        return None;
    }
    declaration_parser().parse(trimmed).into_result().ok()
}

/// Build a [`Participant`] for the line at `line_index`, if it declares one
pub fn parse_participant(line: &str, line_index: usize) -> Option<Participant> {
    let decl = match_declaration(line)?;
    let mut participant =
        Participant::new(decl.name, decl.alias, line_index).with_raw_line(line);
    if let Some(color) = decl.color {
        participant = participant.with_color(color);
    }
    Some(participant)
}
