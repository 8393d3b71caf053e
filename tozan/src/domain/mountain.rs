//! Mountain name handling.
//!
//! Directory keys look like `槍ヶ岳`, `唐松岳・五竜岳`, `大山（鳥取）` or
//! `富士山_2`. The `_N` suffix disambiguates repeated names, the `・` joins
//! peaks climbed from the same trailhead, and the parenthetical is a region
//! qualifier. None of these appear in route descriptions.

/// Separator between peaks sharing one entry.
pub const PEAK_SEPARATOR: char = '・';

/// Helpers for mountain display names.
pub struct MountainName;

impl MountainName {
    /// Strip the qualifier tail from a scraped heading.
    ///
    /// Cuts at the first full-width or ASCII opening parenthesis, or at a
    /// non-breaking space, then trims.
    ///
    /// ```
    /// use tozan::domain::MountainName;
    ///
    /// assert_eq!(MountainName::display("大山（鳥取県）"), "大山");
    /// assert_eq!(MountainName::display("Fuji (Shizuoka)"), "Fuji");
    /// assert_eq!(MountainName::display("雲取山\u{a0}2017m"), "雲取山");
    /// ```
    pub fn display(raw: &str) -> &str {
        let cut = raw
            .find(['（', '(', '\u{a0}'])
            .unwrap_or(raw.len());
        raw[..cut].trim()
    }

    /// The names that identify this mountain inside route text.
    ///
    /// ```
    /// use tozan::domain::MountainName;
    ///
    /// assert_eq!(MountainName::components("唐松岳・五竜岳_2"), vec!["唐松岳", "五竜岳"]);
    /// assert_eq!(MountainName::components("大山（鳥取）"), vec!["大山"]);
    /// ```
    pub fn components(name: &str) -> Vec<&str> {
        let base = name.split('_').next().unwrap_or(name);
        Self::display(base)
            .split(PEAK_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_without_qualifier_is_trimmed() {
        assert_eq!(MountainName::display("  Takao "), "Takao");
    }

    #[test]
    fn components_single_peak() {
        assert_eq!(MountainName::components("Fuji"), vec!["Fuji"]);
    }

    #[test]
    fn components_drops_disambiguation_suffix() {
        assert_eq!(MountainName::components("Fuji_3"), vec!["Fuji"]);
    }

    #[test]
    fn components_of_empty_name() {
        assert!(MountainName::components("").is_empty());
        assert!(MountainName::components("（）").is_empty());
    }
}
