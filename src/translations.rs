// Display labels for raw category and summary keys.
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::types::Legend;

static KEY_TRANSLATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // income categories
        ("darowizny_celowe", "Darowizny Celowe"),
        ("darowizny_inne", "Darowizny Inne"),
        ("darowizny_koronawirus", "Darowizny Koronawirus"),
        ("darowizny_sponsoring", "Darowizny Sponsoring"),
        ("darowizny_statutowe", "Darowizny Statutowe"),
        ("eventy", "eventy"),
        ("inne_wplywy", "inne Wplywy"),
        ("warsztaty", "warsztaty"),
        // cost categories
        ("administracyjne", "administracyjne"),
        ("bank", "bank"),
        ("covid", "covid"),
        ("hosting", "hosting"),
        ("inne_koszty", "inneKoszty"),
        ("internet", "internet"),
        ("ksiegowosc", "ksiegowosc"),
        ("lokal", "lokal"),
        ("ubezpieczenia", "ubezpieczenia"),
        // record sections
        ("income", "Dochód"),
        ("koszty", "Koszty"),
        ("summary", "Suma"),
        // summary fields
        ("bilans", "Bilans"),
        ("start_saldo", "Saldo początkowe"),
        ("end_saldo", "Saldo końcowe"),
        ("safe_threshold", "Próg bezpieczeństwa"),
        ("safe_threshold_difference", "Różnica od progu"),
        ("balance", "Bilans miesiąca"),
        ("costs", "Koszty"),
        ("incomes", "Wpływy"),
        ("other_expenses", "Inne wydatki"),
        ("venue_expenses", "Wydatki na lokal"),
        ("date", "Data"),
    ])
});

/// Label from the built-in table alone, if it has one.
pub fn builtin_label(key: &str) -> Option<&'static str> {
    KEY_TRANSLATIONS.get(key).copied()
}

/// Resolves raw keys to display labels: the dataset legend first, then the
/// built-in table, then the key itself. Empty legend labels are skipped.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    legend: Option<&'a Legend>,
}

impl<'a> Translator<'a> {
    pub fn new(legend: &'a Legend) -> Translator<'a> {
        Translator { legend: Some(legend) }
    }

    /// Resolver with no legend overrides.
    pub fn builtin() -> Translator<'static> {
        Translator { legend: None }
    }

    pub fn resolve<'k>(&self, key: &'k str) -> &'k str
    where
        'a: 'k,
    {
        if let Some(label) = self.legend.and_then(|l| l.get(key)) {
            if !label.is_empty() {
                return label.as_str();
            }
        }
        builtin_label(key).unwrap_or(key)
    }
}
