/// A literal value: constant values and default values.
///
/// Numbers keep their source spelling (`0x1F`, `-1.5e3`) so the generated
/// literal matches what the author wrote.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Number(String),
    Boolean(bool),
    Null,
    String(String),
    /// `Infinity` / `-Infinity`
    Infinity {
        negative: bool,
    },
    NaN,
    /// `[]`
    EmptySequence,
    /// `{}`
    EmptyDictionary,
}
