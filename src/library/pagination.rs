use log::debug;

use crate::library::error::LibraryError;

/// Rebuilds a listing of `total` entries that the remote hands out
/// `page_size` at a time.
///
/// `fetch(offset, limit)` returns one page. Pages are requested at offsets
/// `0, page_size, 2 * page_size, ...` and appended in that order, so exactly
/// `ceil(total / page_size)` pages are requested. A page shorter than what
/// is still missing aborts the assembly instead of asking again.
pub fn assemble<T, F>(total: usize, page_size: usize, mut fetch: F) -> Result<Vec<T>, LibraryError>
where
    F: FnMut(usize, usize) -> Result<Vec<T>, LibraryError>,
{
    if page_size == 0 {
        return Err(LibraryError::IncompletePage("page size must be positive".into()));
    }

    let mut items = Vec::with_capacity(total);
    while items.len() < total {
        let offset = items.len();
        let expected = page_size.min(total - offset);
        debug!("fetching page at offset {offset} ({expected} of {total} expected)");

        let mut page = fetch(offset, page_size)?;
        if page.len() < expected {
            return Err(LibraryError::IncompletePage(format!(
                "page at offset {offset} has {} entries, expected {expected}",
                page.len()
            )));
        }
        page.truncate(expected);
        items.extend(page);
    }
    Ok(items)
}
