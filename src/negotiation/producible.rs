use std::collections::HashSet;

use crate::error::NegotiationError;

use super::mime::MimeType;
use super::resolver;

/// One named response representation and the media type it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: String,
    produced: MimeType,
    precedence: u32,
}

impl Variant {
    pub fn new(name: impl Into<String>, produced: MimeType, precedence: u32) -> Self {
        Self {
            name: name.into(),
            produced,
            precedence,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn produced(&self) -> &MimeType {
        &self.produced
    }

    /// Higher wins when several variants match.
    pub fn precedence(&self) -> u32 {
        self.precedence
    }
}

/// The full, ordered set of variants for one negotiable response.
///
/// Variants keep their declaration order; names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantSet {
    variants: Vec<Variant>,
}

impl VariantSet {
    /// Build a set from variants carrying explicit precedences.
    pub fn new(variants: Vec<Variant>) -> Result<Self, NegotiationError> {
        let mut seen = HashSet::with_capacity(variants.len());
        for v in &variants {
            if !seen.insert(v.name.as_str()) {
                return Err(NegotiationError::DuplicateVariant(v.name.clone()));
            }
        }
        Ok(Self { variants })
    }

    /// Build a set from `(name, media type)` pairs; each variant's
    /// precedence is its declaration index, so later entries win ties.
    pub fn declared<I, N, M>(declarations: I) -> Result<Self, NegotiationError>
    where
        I: IntoIterator<Item = (N, M)>,
        N: Into<String>,
        M: AsRef<str>,
    {
        let variants = declarations
            .into_iter()
            .enumerate()
            .map(|(i, (name, media_type))| {
                let precedence =
                    u32::try_from(i).map_err(|_| NegotiationError::TooManyVariants(i + 1))?;
                let produced = MimeType::parse(media_type.as_ref())?;
                Ok(Variant::new(name, produced, precedence))
            })
            .collect::<Result<Vec<_>, NegotiationError>>()?;
        Self::new(variants)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Variants in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Variants in search order: highest precedence first, and among equal
    /// precedences the later-declared one first.
    pub fn by_precedence(&self) -> Vec<&Variant> {
        let mut ordered: Vec<&Variant> = self.variants.iter().rev().collect();
        ordered.sort_by(|a, b| b.precedence.cmp(&a.precedence));
        ordered
    }
}

/// A typed set of response representations that can be negotiated from
/// `Accept` values.
pub trait Producible: Sized + Copy {
    /// Every representation, in declaration order.
    fn variants() -> Vec<Variant>;

    /// Map a resolved variant back to its typed value.
    fn from_variant(variant: &Variant) -> Option<Self>;

    /// Pick the representation that best fits the accepted media types.
    fn negotiate<S: AsRef<str>>(accepted: &[S]) -> Result<Option<Self>, NegotiationError> {
        let set = VariantSet::new(Self::variants())?;
        Ok(resolver::resolve(accepted, &set)?.and_then(|v| Self::from_variant(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_assigns_increasing_precedence() {
        let set = VariantSet::declared([("A", "text/plain"), ("B", "application/json")]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("A").unwrap().precedence(), 0);
        assert_eq!(set.get("B").unwrap().precedence(), 1);
        assert_eq!(set.get("B").unwrap().produced().subtype(), "json");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = VariantSet::declared([("A", "text/plain"), ("A", "text/html")]).unwrap_err();
        assert_eq!(err, NegotiationError::DuplicateVariant("A".into()));
    }

    #[test]
    fn declared_propagates_parse_errors() {
        let err = VariantSet::declared([("A", "garbage")]).unwrap_err();
        assert!(matches!(err, NegotiationError::Parse { .. }));
    }

    #[test]
    fn search_order_is_descending_precedence() {
        let text = MimeType::from_static("text", "plain", &[]);
        let set = VariantSet::new(vec![
            Variant::new("low", text.clone(), 1),
            Variant::new("high", text.clone(), 9),
            Variant::new("tie-first", text.clone(), 5),
            Variant::new("tie-second", text, 5),
        ])
        .unwrap();

        let names: Vec<_> = set.by_precedence().iter().map(|v| v.name()).collect();
        assert_eq!(names, ["high", "tie-second", "tie-first", "low"]);
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shape {
        Text,
        Json,
    }

    impl Producible for Shape {
        fn variants() -> Vec<Variant> {
            vec![
                Variant::new("Text", MimeType::from_static("text", "plain", &[]), 0),
                Variant::new("Json", MimeType::from_static("application", "json", &[]), 1),
            ]
        }

        fn from_variant(variant: &Variant) -> Option<Self> {
            match variant.name() {
                "Text" => Some(Self::Text),
                "Json" => Some(Self::Json),
                _ => None,
            }
        }
    }

    #[test]
    fn typed_negotiation() {
        assert_eq!(Shape::negotiate::<&str>(&[]).unwrap(), Some(Shape::Json));
        assert_eq!(Shape::negotiate(&["text/*"]).unwrap(), Some(Shape::Text));
        assert_eq!(Shape::negotiate(&["image/png"]).unwrap(), None);
    }
}
