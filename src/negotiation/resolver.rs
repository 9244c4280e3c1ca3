use tracing::{debug, trace};

use crate::error::NegotiationError;

use super::mime::{tokenize, MimeType};
use super::producible::{Variant, VariantSet};

/// Select the variant that best serves a list of accepted media types.
///
/// `accepted` holds raw header elements, each possibly listing several
/// comma-separated media types. With no elements at all the
/// highest-precedence variant is the default. Otherwise every token is
/// matched against the candidates (highest precedence first) and the
/// highest-precedence match over all tokens wins. `q` weights are ignored.
///
/// `Ok(None)` means nothing matched. A malformed token fails the whole call,
/// even if another token already matched.
pub fn resolve<'a, S: AsRef<str>>(
    accepted: &[S],
    candidates: &'a VariantSet,
) -> Result<Option<&'a Variant>, NegotiationError> {
    let ordered = candidates.by_precedence();

    if accepted.is_empty() {
        let fallback = ordered
            .first()
            .copied()
            .ok_or(NegotiationError::EmptyCandidates)?;
        debug!(variant = fallback.name(), "no accepted media types, using default");
        return Ok(Some(fallback));
    }

    let mut result = None;
    for element in accepted {
        for token in tokenize(element.as_ref()) {
            let media_type = MimeType::parse(token)?;
            result = most_recent(result, for_type(&ordered, &media_type));
        }
    }

    debug!(
        accepted = accepted.len(),
        result = ?result.map(Variant::name),
        "resolved producible variant"
    );
    Ok(result)
}

/// Keep whichever side has the higher precedence; a miss never replaces a
/// match, and an equal precedence keeps the existing one.
fn most_recent<'a>(
    existing: Option<&'a Variant>,
    candidate: Option<&'a Variant>,
) -> Option<&'a Variant> {
    let chosen = match (existing, candidate) {
        (Some(e), Some(c)) if c.precedence() > e.precedence() => Some(c),
        (Some(e), _) => Some(e),
        (None, c) => c,
    };
    trace!(
        existing = ?existing.map(Variant::name),
        candidate = ?candidate.map(Variant::name),
        chosen = ?chosen.map(Variant::name),
        "combined match"
    );
    chosen
}

fn for_type<'a>(ordered: &[&'a Variant], media_type: &MimeType) -> Option<&'a Variant> {
    let found = ordered
        .iter()
        .copied()
        .find(|v| media_type.is_compatible_with(v.produced()));
    trace!(%media_type, found = ?found.map(Variant::name), "matched token");
    found
}
