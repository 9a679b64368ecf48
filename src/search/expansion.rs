//! Concept expansion.
//!
//! A small, hand-curated concept → related-terms table. Terms outside it get no semantic
//! widening; repurposing the engine for another domain means replacing this table.

/// Normalized concept token and the normalized terms it widens to.
pub const CONCEPTS: &[(&str, &[&str])] = &[
    ("dios", &["senor", "padre", "creador", "altisimo"]),
    ("senor", &["dios", "jehova"]),
    ("jehova", &["senor", "dios"]),
    ("jesus", &["cristo", "hijo", "mesias"]),
    ("cristo", &["jesus", "mesias"]),
    ("amor", &["amo", "ama", "amado", "caridad"]),
    ("luz", &["lumbrera", "resplandece", "resplandor"]),
    ("oscuridad", &["tinieblas", "sombra", "noche"]),
    ("paz", &["reposo", "descanso", "sosiego"]),
    ("fe", &["cree", "creer", "confianza"]),
    ("pecado", &["transgresion", "iniquidad", "maldad"]),
    ("salvacion", &["salvo", "redencion", "rescate"]),
    ("vida", &["vivir", "vive", "eterna"]),
    ("muerte", &["morir", "muerto", "sepulcro"]),
    ("palabra", &["verbo", "dicho"]),
    ("gozo", &["alegria", "regocijo"]),
    ("temor", &["miedo", "temere"]),
    ("pastor", &["pastoreara", "cayado", "rebano"]),
    ("creacion", &["creo", "principio", "hizo"]),
    ("mundo", &["tierra", "cielos"]),
];

/// Related terms for a normalized token, if it names a known concept.
pub fn related_terms(token: &str) -> &'static [&'static str] {
    CONCEPTS
        .iter()
        .find(|(concept, _)| *concept == token)
        .map(|(_, terms)| *terms)
        .unwrap_or(&[])
}

/// `tokens` followed by every related term, without repeats.
pub fn expand(tokens: &[String]) -> Vec<String> {
    let mut expanded: Vec<String> = Vec::with_capacity(tokens.len());
    let related = tokens
        .iter()
        .flat_map(|token| related_terms(token).iter().map(|term| term.to_string()));

    for term in tokens.iter().cloned().chain(related) {
        if !expanded.contains(&term) {
            expanded.push(term);
        }
    }
    expanded
}
