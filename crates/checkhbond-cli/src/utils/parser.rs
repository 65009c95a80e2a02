use crate::error::CliError;
use checkhbond::core::models::residue::ResidueSpec;

/// Parses a residue specifier of the form `<chain><number>[insert]`, e.g.
/// `A23`, `L101`, `A57B`. The chain is a single letter, the optional
/// insertion code a trailing letter.
pub fn parse_residue_spec(text: &str) -> Result<ResidueSpec, CliError> {
    let invalid = || CliError::Argument(format!("cannot parse residue specifier '{text}'"));

    let mut chars = text.chars();
    let chain = chars.next().filter(|c| c.is_ascii_alphabetic()).ok_or_else(invalid)?;

    let rest: &str = chars.as_str();
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '-')
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let (number_text, insert_text) = rest.split_at(digits_end);

    let number: isize = number_text.parse().map_err(|_| invalid())?;
    let insertion_code = match insert_text.len() {
        0 => ' ',
        1 => insert_text
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    Ok(ResidueSpec::new(
        chain.to_ascii_uppercase(),
        number,
        insertion_code.to_ascii_uppercase(),
    ))
}
