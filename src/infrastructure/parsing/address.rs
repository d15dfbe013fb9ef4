//! Heuristic classifier for candidate address strings

/// Terms that never appear in a genuine street address on the site
const DENY_TERMS: &[&str] = &[
    "mercado libre",
    "mercadolibre",
    "ml",
    "mlm-",
    "contraseña",
    "pin",
    "whatsapp",
    "email",
    "características",
    "publicación",
    "precio",
    "venta",
    "compra",
    "casa",
    "inmueble",
    "metros cuadrados",
    "m²",
    "m2",
    "recámara",
    "baño",
    "estacionamiento",
    "terreno",
    "construcción",
    "superficie",
    "pisos",
];

/// Road-type tokens
const ROAD_TOKENS: &[&str] = &[
    "colonia",
    "col.",
    "calle",
    "c.",
    "avenida",
    "av.",
    "privada",
    "priv.",
    "boulevard",
    "blvd",
    "fraccionamiento",
    "fracc",
    "calzada",
    "calz.",
    "andador",
    "circuito",
    "paseo",
    "plaza",
    "glorieta",
];

/// Gazetteer of places that show up in listing addresses
const PLACE_NAMES: &[&str] = &[
    "cuernavaca",
    "morelos",
    "cdmx",
    "ciudad de méxico",
    "méxico",
    "estado de méxico",
    "nezahualcóyotl",
    "nezahualcoyotl",
    "tecámac",
    "tecamac",
    "atizapán",
    "atizapan",
    "coyoacán",
    "coyoacan",
    "zapopan",
    "guadalajara",
    "mérida",
    "merida",
    "yucatán",
    "yucatan",
    "metropolitana",
    "villa del real",
    "mayorazgos",
    "distrito federal",
    "alvaro obregón",
    "queretaro",
    "querétaro",
    "oaxaca",
    "chiapas",
    "tuxtla gutierrez",
    "tapachula",
    "campeche",
    "quintana roo",
    "cancun",
    "cancún",
    "playa del carmen",
    "tabasco",
    "villahermosa",
    "veracruz",
    "xalapa",
    "coatzacoalcos",
    "puebla",
    "tlaxcala",
    "guerrero",
    "acapulco",
    "chilpancingo",
    "hidalgo",
    "pachuca",
    "guanajuato",
    "leon",
    "león",
    "irapuato",
    "celaya",
    "michoacan",
    "michoacán",
    "morelia",
    "lazaro cardenas",
    "jalisco",
    "monterrey",
    "nuevo león",
];

const MIN_ADDRESS_CHARS: usize = 15;
const MIN_ADDRESS_WORDS: usize = 3;

/// Decide whether `text` reads like a street address.
pub fn looks_like_address(text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() < MIN_ADDRESS_CHARS {
        return false;
    }

    let lower = text.to_lowercase();
    if DENY_TERMS.iter().any(|term| contains_term(&lower, term)) {
        return false;
    }

    let total = text.chars().count();
    let digits = text.chars().filter(char::is_ascii_digit).count();
    if digits * 2 > total {
        return false;
    }

    if text.split_whitespace().count() < MIN_ADDRESS_WORDS {
        return false;
    }

    let names_a_place = ROAD_TOKENS
        .iter()
        .chain(PLACE_NAMES)
        .any(|token| lower.contains(token));

    names_a_place && has_structure(&lower)
}

/// Comma-separated parts, a street number, or a travel-time hint
fn has_structure(lower: &str) -> bool {
    let comma_parts = lower.split(',').filter(|p| !p.trim().is_empty()).count();
    (lower.contains(',') && comma_parts >= 2)
        || lower.chars().any(|c| c.is_ascii_digit())
        || lower.contains("minutos")
}

/// Short terms only match whole words so "ml" does not reject "Almoloya".
fn contains_term(haystack: &str, term: &str) -> bool {
    if term.chars().count() > 3 {
        return haystack.contains(term);
    }
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == term)
}
