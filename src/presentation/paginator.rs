//! Paginación de listas ordenadas
//!
//! Páginas numeradas desde 1. La política es de acotamiento: cualquier número
//! de página fuera de `[1, total_pages]` se lleva al límite más cercano, así
//! que nunca se devuelve una página vacía mientras la lista tenga elementos.
//! Una lista vacía tiene una sola página (vacía), nunca "página 1 de 0".

use serde::Serialize;

/// Total de páginas; nunca menor que 1
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// Acotar un número de página al rango válido
pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size))
}

/// Rebanada de la página pedida, ya acotada
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    let page_size = page_size.max(1);
    let page = clamp_page(page, items.len(), page_size);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    &items[start.min(items.len())..end]
}

/// Estado de paginación de una tabla
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page: usize,
    page_size: usize,
    total_items: usize,
}

impl Paginator {
    pub fn new(total_items: usize, page_size: usize, page: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page: clamp_page(page, total_items, page_size),
            page_size,
            total_items,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Avanzar una página; sin efecto en la última
    pub fn next(&mut self) {
        if self.has_next() {
            self.page += 1;
        }
    }

    /// Retroceder una página; sin efecto en la primera
    pub fn prev(&mut self) {
        if self.has_prev() {
            self.page -= 1;
        }
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = clamp_page(page, self.total_items, self.page_size);
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page_size, self.page)
    }

    /// Construir la vista serializable de la página actual
    pub fn view<T: Clone>(&self, items: &[T]) -> PageView<T> {
        PageView {
            items: self.slice(items).to_vec(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages(),
            has_next: self.has_next(),
            has_prev: self.has_prev(),
        }
    }
}

/// Página lista para serializar
#[derive(Debug, Clone, Serialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> PageView<T> {
    /// Transformar los elementos de la página; el primer error corta
    pub fn try_map<U, E, F>(self, f: F) -> Result<PageView<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(PageView {
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        })
    }
}
