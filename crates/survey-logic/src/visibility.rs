use crate::error::LogicError;
use crate::model::component::Component;
use crate::model::page::Page;
use crate::resolve::resolve_optional;
use crate::responses::Responses;

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Visibility flag for every component on the page.
pub fn resolve_visibility(page: &Page, responses: &Responses) -> Result<VisibilityMap, LogicError> {
    let mut map = VisibilityMap::new();
    for component in &page.components {
        let visible = resolve_optional(component.visibility.as_ref(), responses)?;
        map.insert(component.id.clone(), visible);
    }
    Ok(map)
}

/// Components currently shown on the page, in declaration order.
pub fn visible_components<'a>(
    page: &'a Page,
    responses: &Responses,
) -> Result<Vec<&'a Component>, LogicError> {
    let mut visible = Vec::with_capacity(page.components.len());
    for component in &page.components {
        if resolve_optional(component.visibility.as_ref(), responses)? {
            visible.push(component);
        }
    }
    Ok(visible)
}
