//! Line name normalization.
//!
//! Raw line names carry a terminal-pair suffix, e.g.
//! "Line 1 (Pingguoyuan--Sihui)". Callers refer to the same physical line
//! by short forms ("Line 1"), loop-suffix variants, or other aliases, and
//! the timetable itself may hold several name variants for one physical
//! line. This module maps any of those spellings onto the raw data names.

use std::collections::HashMap;
use std::sync::Mutex;

/// Strip parenthesized suffixes from a line name and trim whitespace.
///
/// "Line 1 (Pingguoyuan--Sihui)" becomes "Line 1".
pub fn clean_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// The numeric identifier of a "Line N"-form name, if it has one.
///
/// Only the canonical "Line N" form counts, so "S1 Line" has no number and
/// can never collide with "Line 1".
pub fn line_number(name: &str) -> Option<u32> {
    let cleaned = clean_name(name);
    let rest = cleaned.strip_prefix("Line ")?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// The base name identifying a physical line: "Line N" for numbered lines,
/// otherwise the cleaned name.
pub fn base_name(name: &str) -> String {
    match line_number(name) {
        Some(n) => format!("Line {n}"),
        None => clean_name(name),
    }
}

/// The terminal station pair encoded in a full line name.
///
/// "Line 2 (Xizhimen--Jishuitan)" yields ("Xizhimen", "Jishuitan").
pub fn terminal_pair(name: &str) -> Option<(String, String)> {
    let open = name.find('(')?;
    let close = name[open..].find(')')? + open;
    let inner = &name[open + 1..close];
    let (start, end) = inner.split_once("--")?;
    let start = start.trim();
    let end = end.trim();
    if start.is_empty() || end.is_empty() {
        return None;
    }
    Some((start.to_string(), end.to_string()))
}

/// Whether a line is a loop: its name carries a loop marker, or its two
/// declared terminals coincide.
pub fn is_loop_line(name: &str) -> bool {
    if name.to_ascii_lowercase().contains("loop") {
        return true;
    }
    matches!(terminal_pair(name), Some((start, end)) if start == end)
}

/// Whether two line names plausibly refer to the same physical line.
///
/// Numbered lines compare by number alone ("Line 1" must never match
/// "Line 10" by prefix); other lines compare by cleaned-name containment.
pub fn similar(a: &str, b: &str) -> bool {
    if let (Some(na), Some(nb)) = (line_number(a), line_number(b)) {
        return na == nb;
    }

    let clean_a = clean_name(a);
    let clean_b = clean_name(b);
    !clean_a.is_empty()
        && !clean_b.is_empty()
        && (clean_a.contains(&clean_b) || clean_b.contains(&clean_a))
}

/// Alias resolver over the set of line names present in the raw timetable.
///
/// Normalization is idempotent and cached per distinct input; the cache is
/// owned by the instance, so concurrent queries against a shared index stay
/// independent of process state.
#[derive(Debug, Default)]
pub struct LineAliases {
    /// Full raw-data line names, sorted for deterministic resolution.
    all_lines: Vec<String>,

    /// Short/alias name to the full names it may refer to.
    alias_map: HashMap<String, Vec<String>>,

    cache: Mutex<HashMap<String, String>>,
}

impl LineAliases {
    /// Build the alias map from every line name the raw timetable knows.
    pub fn build(lines: impl IntoIterator<Item = String>) -> Self {
        let mut all_lines: Vec<String> = lines.into_iter().collect();
        all_lines.sort();
        all_lines.dedup();

        let mut alias_map: HashMap<String, Vec<String>> = HashMap::new();
        for full in &all_lines {
            let base = base_name(full);
            if base != *full {
                alias_map.entry(base).or_default().push(full.clone());
            }
            let cleaned = clean_name(full);
            if cleaned != *full {
                alias_map.entry(cleaned).or_default().push(full.clone());
            }
            // Every full name maps at least to itself.
            alias_map.entry(full.clone()).or_default().push(full.clone());
        }

        Self {
            all_lines,
            alias_map,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Full raw-data line names, sorted.
    pub fn all_lines(&self) -> &[String] {
        &self.all_lines
    }

    /// Resolve any spelling of a line name to the raw-data name it denotes.
    ///
    /// Resolution order: exact raw name, alias map (longest candidate),
    /// containment/similarity scan, matching line number. Unresolvable
    /// names normalize to themselves, so the operation is idempotent.
    pub fn normalize(&self, name: &str) -> String {
        if let Some(hit) = self.cache.lock().expect("alias cache poisoned").get(name) {
            return hit.clone();
        }

        let resolved = self.resolve(name);
        self.cache
            .lock()
            .expect("alias cache poisoned")
            .insert(name.to_string(), resolved.clone());
        resolved
    }

    fn resolve(&self, name: &str) -> String {
        if self.all_lines.iter().any(|l| l == name) {
            return name.to_string();
        }

        if let Some(candidates) = self.alias_map.get(name) {
            // Longest name carries the most information (terminal suffix).
            if let Some(best) = candidates.iter().max_by_key(|c| c.len()) {
                return best.clone();
            }
        }

        // Number-guarded similarity first, raw containment as a last resort.
        if let Some(best) = self
            .all_lines
            .iter()
            .filter(|full| similar(name, full))
            .max_by_key(|full| full.len())
        {
            return best.clone();
        }

        if let Some(best) = self
            .all_lines
            .iter()
            .filter(|full| full.contains(name) || name.contains(full.as_str()))
            .max_by_key(|full| full.len())
        {
            return best.clone();
        }

        name.to_string()
    }

    /// All raw-data name variants of the physical line `name` refers to.
    pub fn variants_of(&self, name: &str) -> Vec<String> {
        let base = base_name(name);
        let mut variants: Vec<String> = self
            .all_lines
            .iter()
            .filter(|full| base_name(full) == base)
            .cloned()
            .collect();
        if variants.is_empty() {
            variants.push(self.normalize(name));
        }
        variants
    }

    /// Name spellings worth trying when querying schedules for a line:
    /// the name itself, its normalization, and its base short form.
    pub fn search_variants(&self, name: &str) -> Vec<String> {
        let mut variants = vec![name.to_string()];
        for candidate in [self.normalize(name), base_name(name)] {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const L1: &str = "Line 1 (Pingguoyuan--Sihui)";
    const L2: &str = "Line 2 (Xizhimen--Jishuitan)";
    const L10: &str = "Line 10 (Bagou--Jinsong)";
    const AIRPORT: &str = "Airport Express (Dongzhimen--Terminal 2)";

    fn aliases() -> LineAliases {
        LineAliases::build(
            [L1, L2, L10, AIRPORT].into_iter().map(String::from),
        )
    }

    #[test]
    fn clean_strips_terminal_suffix() {
        assert_eq!(clean_name(L1), "Line 1");
        assert_eq!(clean_name("Line 2"), "Line 2");
        assert_eq!(clean_name(AIRPORT), "Airport Express");
    }

    #[test]
    fn line_number_requires_canonical_form() {
        assert_eq!(line_number(L1), Some(1));
        assert_eq!(line_number(L10), Some(10));
        assert_eq!(line_number("S1 Line"), None);
        assert_eq!(line_number(AIRPORT), None);
    }

    #[test]
    fn base_name_for_numbered_and_named_lines() {
        assert_eq!(base_name(L1), "Line 1");
        assert_eq!(base_name(AIRPORT), "Airport Express");
    }

    #[test]
    fn terminal_pair_parses_suffix() {
        assert_eq!(
            terminal_pair(L2),
            Some(("Xizhimen".to_string(), "Jishuitan".to_string()))
        );
        assert_eq!(terminal_pair("Line 2"), None);
        assert_eq!(terminal_pair("Line 2 (Xizhimen)"), None);
    }

    #[test]
    fn loop_detection() {
        assert!(is_loop_line("Line 2 Inner Loop"));
        assert!(is_loop_line("Line 10 (Bagou--Bagou)"));
        assert!(!is_loop_line(L1));
    }

    #[test]
    fn similar_lines() {
        assert!(similar("Line 1", L1));
        assert!(similar(L1, "Line 1 Express (Pingguoyuan--Sihui)"));
        assert!(!similar("Line 1", L10));
        assert!(!similar("S1 Line", L1));
    }

    #[test]
    fn normalize_short_name() {
        let aliases = aliases();
        assert_eq!(aliases.normalize("Line 1"), L1);
        assert_eq!(aliases.normalize("Line 10"), L10);
        assert_eq!(aliases.normalize("Airport Express"), AIRPORT);
    }

    #[test]
    fn normalize_is_idempotent_on_canonical_names() {
        let aliases = aliases();
        for full in [L1, L2, L10, AIRPORT] {
            assert_eq!(aliases.normalize(full), full);
            // Normalizing the result changes nothing.
            let once = aliases.normalize(full);
            assert_eq!(aliases.normalize(&once), once);
        }
    }

    #[test]
    fn normalize_unknown_returns_input() {
        let aliases = aliases();
        assert_eq!(aliases.normalize("Maglev"), "Maglev");
    }

    #[test]
    fn short_name_does_not_cross_line_numbers() {
        let aliases = aliases();
        // "Line 1" must not resolve to "Line 10 (...)" even though it is a
        // substring of it.
        assert_eq!(aliases.normalize("Line 1"), L1);
    }

    #[test]
    fn variants_group_by_physical_line() {
        let both = LineAliases::build(
            [
                L1.to_string(),
                "Line 1 Batong Extension (Sihui--Tuqiao)".to_string(),
                L2.to_string(),
            ]
            .into_iter(),
        );

        let variants = both.variants_of("Line 1");
        assert_eq!(variants.len(), 2);
        assert!(variants.iter().any(|v| v == L1));
    }

    #[test]
    fn search_variants_include_base_form() {
        let aliases = aliases();
        let variants = aliases.search_variants(L1);
        assert!(variants.contains(&L1.to_string()));
        assert!(variants.contains(&"Line 1".to_string()));
    }
}
