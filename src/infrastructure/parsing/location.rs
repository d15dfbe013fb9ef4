//! Free-form address to country / state / city

use crate::domain::location::Location;

/// Known spellings of Mexican states, matched case-insensitively
const STATE_ALIASES: &[(&[&str], &str)] = &[
    (
        &["distrito federal", "df", "d.f.", "cdmx", "ciudad de méxico", "ciudad de mexico"],
        "Ciudad de México",
    ),
    (
        &[
            "estado de méxico",
            "estado de mexico",
            "edomex",
            "edo. de méxico",
            "edo. de mexico",
            "mexico",
            "méxico",
        ],
        "Estado de México",
    ),
    (&["morelos", "estado de morelos"], "Morelos"),
    (&["yucatan", "yucatán"], "Yucatán"),
    (&["queretaro", "querétaro"], "Querétaro"),
    (&["jalisco"], "Jalisco"),
    (&["sinaloa"], "Sinaloa"),
    (&["nuevo leon", "nuevo león"], "Nuevo León"),
    (&["quintana roo"], "Quintana Roo"),
    (&["michoacan", "michoacán"], "Michoacán"),
];

/// Parse a raw address into a structured location.
///
/// The last comma-separated part is the state and the one before it the
/// city. The country is always Mexico.
pub fn parse_location(raw: &str) -> Location {
    let mut location = Location::default();

    let parts: Vec<String> = raw
        .split(',')
        .map(collapse_whitespace)
        .filter(|part| !part.is_empty())
        .collect();

    match parts.as_slice() {
        [] => {}
        [state] => location.state = Some(normalize_state(state)),
        [.., city, state] => {
            location.state = Some(normalize_state(state));
            location.city = Some(title_case(city));
        }
    }

    location
}

/// Map a state spelling to its canonical name, title-casing anything unknown.
pub fn normalize_state(raw: &str) -> String {
    let key = collapse_whitespace(raw).to_lowercase();
    STATE_ALIASES
        .iter()
        .find(|(aliases, _)| aliases.contains(&key.as_str()))
        .map_or_else(|| title_case(&key), |(_, canonical)| (*canonical).to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_full_address() {
        let location = parse_location("Privada Los Pinos 45, Centro, Cuernavaca, Morelos");
        assert_eq!(location.country, "Mexico");
        assert_eq!(location.state.as_deref(), Some("Morelos"));
        assert_eq!(location.city.as_deref(), Some("Cuernavaca"));
    }

    #[test]
    fn test_two_parts() {
        let location = parse_location("Colonia del Valle, CDMX");
        assert_eq!(location.state.as_deref(), Some("Ciudad de México"));
        assert_eq!(location.city.as_deref(), Some("Colonia Del Valle"));
    }

    #[test]
    fn test_single_and_empty() {
        let location = parse_location("  edomex ");
        assert_eq!(location.state.as_deref(), Some("Estado de México"));
        assert_eq!(location.city, None);

        let location = parse_location(" , ,");
        assert_eq!(location, Location::default());
        assert_eq!(location.country, "Mexico");
    }

    #[test]
    fn test_irregular_spacing() {
        let location = parse_location("Calle 5 ,Centro ,   zapopan,jalisco  ");
        assert_eq!(location.city.as_deref(), Some("Zapopan"));
        assert_eq!(location.state.as_deref(), Some("Jalisco"));
    }

    #[rstest]
    #[case("CDMX", "Ciudad de México")]
    #[case("Distrito Federal", "Ciudad de México")]
    #[case("DF", "Ciudad de México")]
    #[case("Edomex", "Estado de México")]
    #[case("YUCATAN", "Yucatán")]
    #[case("querétaro", "Querétaro")]
    #[case("baja california sur", "Baja California Sur")]
    fn test_normalize_state(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_state(raw), expected);
    }
}
