use regex::Regex;
use std::sync::LazyLock;

const UNIT_WORDS: &[&str] = &[
    "g", "gr", "grama", "gramas", "kg", "quilograma", "quilogramas", "ml", "mililitro",
    "mililitros", "l", "litro", "litros", "xícara", "xícaras", "xic", "xics", "copo", "copos",
    "colher", "colheres", "col", "cols", "sopa", "sobremesa", "chá", "café", "unidade",
    "unidades", "und", "pc", "pç", "peça", "peças", "dente", "dentes", "fatia", "fatias",
    "rodela", "rodelas", "pitada", "pitadas", "punhado", "punhados", "lata", "latas", "pacote",
    "pacotes", "caixa", "caixas", "maço", "maços", "molho", "molhos", "ramo", "ramos",
];

const CONNECTIVE_WORDS: &[&str] = &[
    "de", "da", "do", "das", "dos", "em", "no", "na", "nos", "nas", "à", "ao", "aos", "às",
    "para", "por", "com", "sem", "o", "a", "os", "as", "um", "uma", "uns", "umas", "e", "ou",
];

const DESCRIPTOR_WORDS: &[&str] = &[
    "picado", "picada", "picados", "picadas", "ralado", "ralada", "ralados", "raladas",
    "fatiado", "fatiada", "fatiados", "fatiadas", "cortado", "cortada", "cortados", "cortadas",
    "moído", "moída", "moídos", "moídas", "batido", "batida", "batidos", "batidas", "cozido",
    "cozida", "cozidos", "cozidas", "cru", "crua", "crus", "cruas", "fresco", "fresca",
    "frescos", "frescas", "seco", "seca", "secos", "secas", "maduro", "madura", "maduros",
    "maduras", "verde", "verdes", "vermelho", "vermelha", "amarelo", "amarela", "grande",
    "grandes", "pequeno", "pequena", "pequenos", "pequenas", "médio", "média", "médios",
    "médias", "inteiro", "inteira", "inteiros", "inteiras", "derretido", "derretida",
    "peneirado", "peneirada", "gelado", "gelada", "morno", "morna",
];

const IRREGULAR_SINGULARS: &[(&str, &str)] = &[
    ("ovos", "ovo"),
    ("tomates", "tomate"),
    ("cebolas", "cebola"),
    ("alhos", "alho"),
];

static PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static OPTIONAL_PHRASES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:a gosto|opcional|se necessário|conforme necessário|ou mais|quanto baste)\b|q\.b\.")
        .unwrap()
});
static NUMBERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?|[½¼¾⅓⅔⅛⅜⅝⅞/]").unwrap());
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;:.!?()\[\]]").unwrap());

/// Reduces an ingredient line to a short search term: "4 ovos" becomes "ovo",
/// "1 xícara de farinha de trigo" becomes "farinha trigo".
///
/// Falls back to the lower-cased original when cleaning leaves nothing useful,
/// so the result is never empty for non-empty input.
pub fn extract_main_ingredient(text: &str) -> String {
    let lowered = text.to_lowercase();

    let cleaned = PARENTHETICAL.replace_all(&lowered, " ");
    let cleaned = OPTIONAL_PHRASES.replace_all(&cleaned, " ");
    let cleaned = NUMBERS.replace_all(&cleaned, " ");
    let cleaned = PUNCTUATION.replace_all(&cleaned, " ");

    // Word lists are only matched against whole tokens so "de" never eats
    // into "dendê" and "sopa" never eats into "sopão".
    let words: Vec<String> = cleaned
        .split_whitespace()
        .filter(|word| {
            !UNIT_WORDS.contains(word)
                && !CONNECTIVE_WORDS.contains(word)
                && !DESCRIPTOR_WORDS.contains(word)
        })
        .map(singularize)
        .collect();

    let joined = words.join(" ");
    if joined.chars().count() < 2 {
        return fallback(text, &lowered);
    }

    let significant: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|word| word.chars().count() > 2)
        .take(2)
        .collect();

    if significant.is_empty() {
        return fallback(text, &lowered);
    }
    significant.join(" ")
}

fn fallback(original: &str, lowered: &str) -> String {
    let trimmed = lowered.trim();
    if trimmed.is_empty() {
        original.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Plural to singular for the forms common in ingredient lists.
pub fn singularize(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR_SINGULARS.iter().find(|(plural, _)| *plural == word) {
        return singular.to_string();
    }
    for suffix in ["ões", "ães"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{stem}ão");
        }
    }
    for suffix in ["ras", "tas", "nas"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 1].to_string();
        }
    }
    word.to_string()
}

/// Lower-cases and strips Portuguese diacritics for comparisons.
pub fn fold_diacritics(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_plural() {
        assert_eq!(extract_main_ingredient("4 ovos"), "ovo");
    }

    #[test]
    fn test_units_and_adjectives_removed() {
        assert_eq!(extract_main_ingredient("200g de tomate picado"), "tomate");
        assert_eq!(
            extract_main_ingredient("1 xícara de farinha de trigo"),
            "farinha trigo"
        );
        assert_eq!(
            extract_main_ingredient("2 colheres (sopa) de manteiga derretida"),
            "manteiga"
        );
    }

    #[test]
    fn test_optional_phrases_removed() {
        assert_eq!(extract_main_ingredient("sal a gosto"), "sal");
        assert_eq!(extract_main_ingredient("Orégano (opcional)"), "orégano");
        assert_eq!(extract_main_ingredient("½ xícara de açúcar"), "açúcar");
    }

    #[test]
    fn test_suffix_singularization() {
        assert_eq!(extract_main_ingredient("3 batatas médias"), "batata");
        assert_eq!(extract_main_ingredient("2 cenouras raladas"), "cenoura");
        assert_eq!(extract_main_ingredient("2 limões"), "limão");
        assert_eq!(singularize("pães"), "pão");
        assert_eq!(singularize("azeitonas"), "azeitona");
        assert_eq!(singularize("leite"), "leite");
    }

    #[test]
    fn test_connectives_only_removed_as_whole_words() {
        assert_eq!(extract_main_ingredient("1 colher de azeite de dendê"), "azeite dendê");
    }

    #[test]
    fn test_fallback_to_original() {
        assert_eq!(extract_main_ingredient("1 g"), "1 g");
        assert_eq!(extract_main_ingredient("Sal"), "sal");
        assert!(!extract_main_ingredient("  ").is_empty());
    }

    #[test]
    fn test_short_words_are_skipped() {
        assert_eq!(extract_main_ingredient("1 pé de alface"), "alface");
    }

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Maçã Açúcar"), "maca acucar");
        assert_eq!(fold_diacritics("LIMÃO"), "limao");
    }
}
