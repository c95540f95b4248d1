//! Filtro de rango sobre series cronológicas
//!
//! Devuelve los últimos N elementos de una serie. N lo ajusta el usuario con un
//! slider dentro de `[min, max]`; valores fuera del rango se acotan antes de usarse.

use serde::Serialize;

/// Últimos `window` elementos, en su orden original
pub fn last_n<T>(items: &[T], window: usize) -> &[T] {
    let start = items.len().saturating_sub(window);
    &items[start..]
}

/// Ventana ajustable con límites declarados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeFilter {
    min: usize,
    max: usize,
    window: usize,
}

impl Default for RangeFilter {
    /// Slider de semanas del dashboard financiero: 2 a 12, inicia en 4
    fn default() -> Self {
        Self::new(2, 12, 4)
    }
}

impl RangeFilter {
    pub fn new(min: usize, max: usize, window: usize) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            window: window.clamp(min, max),
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Ajustar la ventana, acotada a `[min, max]`
    pub fn set_window(&mut self, window: usize) {
        self.window = window.clamp(self.min, self.max);
    }

    pub fn with_window(mut self, window: Option<usize>) -> Self {
        if let Some(window) = window {
            self.set_window(window);
        }
        self
    }

    pub fn apply<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        last_n(items, self.window)
    }
}

/// Subtítulo "Semanas X a Y" a partir de las etiquetas de la ventana visible
pub fn range_label<T, F>(visible: &[T], label_of: F) -> Option<String>
where
    F: Fn(&T) -> String,
{
    let first = visible.first()?;
    let last = visible.last()?;
    Some(format!("Semanas {} a {}", label_of(first), label_of(last)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_most_recent_in_order() {
        let weeks: Vec<u32> = (1..=8).collect();
        let filter = RangeFilter::default();
        assert_eq!(filter.apply(&weeks), &[5, 6, 7, 8]);
    }

    #[test]
    fn test_window_never_exceeds_length() {
        let weeks: Vec<u32> = (1..=8).collect();
        for n in 2..=12 {
            let filter = RangeFilter::default().with_window(Some(n));
            assert_eq!(filter.apply(&weeks).len(), n.min(weeks.len()));
        }
    }

    #[test]
    fn test_out_of_range_window_is_clamped() {
        let mut filter = RangeFilter::default();
        filter.set_window(50);
        assert_eq!(filter.window(), 12);
        filter.set_window(0);
        assert_eq!(filter.window(), 2);
    }

    #[test]
    fn test_range_label() {
        let weeks = vec!["Sem 5", "Sem 6", "Sem 7", "Sem 8"];
        let label = range_label(&weeks, |w| w.to_string()).unwrap();
        assert_eq!(label, "Semanas Sem 5 a Sem 8");
        let empty: Vec<&str> = Vec::new();
        assert!(range_label(&empty, |w| w.to_string()).is_none());
    }
}
