//! Vote citation formatters
//!
//! Three source types share the House of Commons vote vocabulary: the
//! question itself, a party's position, and an individual member's ballot.
//! Coded decision values map through fixed bilingual tables; unrecognized
//! codes pass through verbatim into both language slots.

use super::{format_date, unknown_date, Bilingual, Citation, CitationOverrides, SourceType};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteQuestionInput {
    pub parliament: Option<u32>,
    pub session: Option<u32>,
    pub number: Option<u32>,
    pub date: Option<String>,
    pub subject: Option<String>,
    /// Coded outcome, e.g. "Y" / "N"
    pub result: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VotePartyInput {
    pub parliament: Option<u32>,
    pub session: Option<u32>,
    pub number: Option<u32>,
    pub date: Option<String>,
    pub party: Option<String>,
    /// Coded position, e.g. "Y" / "N"
    pub vote: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoteMemberInput {
    pub parliament: Option<u32>,
    pub session: Option<u32>,
    pub number: Option<u32>,
    pub date: Option<String>,
    pub member: Option<String>,
    /// Coded ballot, e.g. "Y" / "N" / "P"
    pub vote: Option<String>,
}

/// Outcome of the question as a whole
fn decision_label(code: &str) -> Bilingual {
    match code {
        "Y" => Bilingual::new("Agreed to", "Adoptée"),
        "N" => Bilingual::new("Negatived", "Rejetée"),
        other => Bilingual::same(other),
    }
}

/// An individual or party position
fn ballot_label(code: &str) -> Bilingual {
    match code {
        "Y" => Bilingual::new("Yea", "Pour"),
        "N" => Bilingual::new("Nay", "Contre"),
        "P" => Bilingual::new("Paired", "Pairé"),
        other => Bilingual::same(other),
    }
}

/// Language-parameterized vote URL. A zero or absent vote number yields
/// the generic votes landing page rather than a malformed specific one.
fn vote_url(input_number: Option<u32>, parliament: Option<u32>, session: Option<u32>) -> Bilingual {
    match (parliament, session, input_number) {
        (Some(parliament), Some(session), Some(number)) if number > 0 => Bilingual::new(
            format!(
                "https://www.ourcommons.ca/members/en/votes/{}/{}/{}",
                parliament, session, number
            ),
            format!(
                "https://www.ourcommons.ca/members/fr/votes/{}/{}/{}",
                parliament, session, number
            ),
        ),
        _ => Bilingual::new(
            "https://www.ourcommons.ca/members/en/votes",
            "https://www.ourcommons.ca/members/fr/votes",
        ),
    }
}

fn vote_title(number: Option<u32>) -> Bilingual {
    match number.filter(|n| *n > 0) {
        Some(number) => Bilingual::new(
            format!("House of Commons Vote No. {}", number),
            format!("Vote nº {} de la Chambre des communes", number),
        ),
        None => Bilingual::new(
            "House of Commons vote",
            "Vote de la Chambre des communes",
        ),
    }
}

fn date_or_placeholder(date: Option<&String>) -> Bilingual {
    match date {
        Some(raw) => format_date(raw),
        None => unknown_date(),
    }
}

fn finish(mut citation: Citation, overrides: Option<&CitationOverrides>) -> Citation {
    if let Some(overrides) = overrides {
        overrides.apply(&mut citation);
    }
    citation
}

/// Citation for a vote question
pub fn build_vote_question_citation(
    id: usize,
    input: &VoteQuestionInput,
    overrides: Option<&CitationOverrides>,
) -> Citation {
    let date = date_or_placeholder(input.date.as_ref());
    let subject = match &input.subject {
        Some(subject) => Bilingual::same(subject.clone()),
        None => Bilingual::new("unknown subject", "sujet inconnu"),
    };
    let result = match &input.result {
        Some(code) => decision_label(code),
        None => Bilingual::new("unknown result", "résultat inconnu"),
    };

    let number_en = input
        .number
        .filter(|n| *n > 0)
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());

    let citation = Citation {
        id,
        source_type: SourceType::VoteQuestion,
        text: Bilingual::new(
            format!(
                "Vote No. {}, {}: {} ({})",
                number_en, date.en, subject.en, result.en
            ),
            format!(
                "Vote nº {}, {} : {} ({})",
                number_en, date.fr, subject.fr, result.fr
            ),
        ),
        title: vote_title(input.number),
        url: Some(vote_url(input.number, input.parliament, input.session)),
    };

    finish(citation, overrides)
}

/// Citation for a party's position on a vote
pub fn build_vote_party_citation(
    id: usize,
    input: &VotePartyInput,
    overrides: Option<&CitationOverrides>,
) -> Citation {
    let date = date_or_placeholder(input.date.as_ref());
    let party = match &input.party {
        Some(party) => Bilingual::same(party.clone()),
        None => Bilingual::new("unknown party", "parti inconnu"),
    };
    let position = match &input.vote {
        Some(code) => ballot_label(code),
        None => Bilingual::new("unknown position", "position inconnue"),
    };

    let title = vote_title(input.number);

    let citation = Citation {
        id,
        source_type: SourceType::VoteParty,
        text: Bilingual::new(
            format!("{}: {} on {}, {}", party.en, position.en, title.en, date.en),
            format!("{} : {} au {}, {}", party.fr, position.fr, title.fr, date.fr),
        ),
        title,
        url: Some(vote_url(input.number, input.parliament, input.session)),
    };

    finish(citation, overrides)
}

/// Citation for an individual member's ballot
pub fn build_vote_member_citation(
    id: usize,
    input: &VoteMemberInput,
    overrides: Option<&CitationOverrides>,
) -> Citation {
    let date = date_or_placeholder(input.date.as_ref());
    let member = match &input.member {
        Some(member) => Bilingual::same(member.clone()),
        None => Bilingual::new("unknown member", "député inconnu"),
    };
    let ballot = match &input.vote {
        Some(code) => ballot_label(code),
        None => Bilingual::new("unknown ballot", "choix inconnu"),
    };

    let title = vote_title(input.number);

    let citation = Citation {
        id,
        source_type: SourceType::VoteMember,
        text: Bilingual::new(
            format!("{} voted {} on {}, {}", member.en, ballot.en, title.en, date.en),
            format!("{} a voté {} au {}, {}", member.fr, ballot.fr, title.fr, date.fr),
        ),
        title,
        url: Some(vote_url(input.number, input.parliament, input.session)),
    };

    finish(citation, overrides)
}
