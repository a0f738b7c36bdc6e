use log::debug;

use crate::info::{BeanClass, Method};

// -----------------------------------------------------------------------------
// Accessibility

fn interface_declares(interface: &BeanClass, method: &Method) -> bool {
    let declared = interface.is_public()
        && interface
            .declared_method(method.name(), method.params())
            .is_some_and(Method::is_public);
    declared
        || interface
            .interfaces()
            .iter()
            .any(|parent| interface_declares(parent, method))
}

/// Returns a publicly invocable version of `method`, declared by `declaring`
/// and reached through `target`.
///
/// A method that is not public, or whose declaring class is not public,
/// is only accessible if an interface implemented along the ancestor
/// chain, or a public ancestor, declares the same signature publicly.
/// The returned method keeps the body of `method`.
pub(crate) fn accessible_method(
    target: &'static BeanClass,
    declaring: &'static BeanClass,
    method: &Method,
) -> Option<Method> {
    if method.is_public() && declaring.is_public() {
        return Some(method.clone());
    }

    let by_interface = target.ancestors().any(|class| {
        class
            .interfaces()
            .iter()
            .any(|interface| interface_declares(interface, method))
    });
    let by_ancestor = || {
        target.ancestors().any(|class| {
            class != declaring
                && class.is_public()
                && class
                    .declared_method(method.name(), method.params())
                    .is_some_and(Method::is_public)
        })
    };

    if by_interface || by_ancestor() {
        Some(method.exposed())
    } else {
        debug!(
            "method `{}` of `{}` is not accessible from `{}`",
            method.name(),
            declaring.name(),
            target.name(),
        );
        None
    }
}

// -----------------------------------------------------------------------------
// Lookup

fn find_in_interface(
    interface: &'static BeanClass,
    name: &str,
    matches: &dyn Fn(&Method) -> bool,
) -> Option<Method> {
    if interface.is_public()
        && let Some(method) = interface
            .methods()
            .iter()
            .find(|m| m.name() == name && m.is_public() && m.has_body() && matches(m))
    {
        return Some(method.clone());
    }
    interface
        .interfaces()
        .iter()
        .find_map(|parent| find_in_interface(parent, name, matches))
}

/// Finds an accessible method named `name` satisfying `matches`.
///
/// Searches the class and its ancestors first, then the interfaces they
/// implement.
pub(crate) fn find_method(
    class: &'static BeanClass,
    name: &str,
    matches: &dyn Fn(&Method) -> bool,
) -> Option<Method> {
    for declaring in class.ancestors() {
        let found = declaring
            .methods()
            .iter()
            .filter(|m| m.name() == name && m.has_body() && matches(m))
            .find_map(|m| accessible_method(class, declaring, m));
        if found.is_some() {
            return found;
        }
    }

    class.ancestors().find_map(|declaring| {
        declaring
            .interfaces()
            .iter()
            .find_map(|interface| find_in_interface(interface, name, matches))
    })
}
