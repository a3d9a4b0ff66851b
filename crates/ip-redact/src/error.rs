use crate::pattern::Family;

/// Error returned when an address pattern cannot be compiled.
///
/// The built-in grammars are fixed, so in practice this only surfaces if the
/// regex engine rejects them (for example because of a size limit).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The pattern source could not be parsed.
    #[error("failed to parse the {family} address pattern")]
    Syntax {
        family: Family,
        #[source]
        source: Box<regex_syntax::Error>,
    },

    /// The parsed pattern could not be compiled into a matcher.
    #[error("failed to compile the {family} address pattern")]
    Compile {
        family: Family,
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },
}
