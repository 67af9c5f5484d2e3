//! Path normalization.
//!
//! Route paths may be written in axum syntax (`/{id}`, `/{*rest}`) or in
//! colon syntax (`/:id`, `/*`). Both normalize to axum syntax with a leading
//! slash and no trailing slash.

/// Normalize a controller base path. Returns `None` for the root.
pub fn normalize_base_path(path: &str) -> Option<String> {
    let normalized = normalize_route_path(path);
    if normalized == "/" {
        None
    } else {
        Some(normalized)
    }
}

/// Normalize a route path into axum syntax.
pub fn normalize_route_path(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(convert_segment)
        .collect();

    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn convert_segment(segment: &str) -> String {
    if let Some(name) = segment.strip_prefix(':') {
        return format!("{{{}}}", name);
    }
    if segment == "*" {
        return "{*wildcard}".to_string();
    }
    if let Some(name) = segment.strip_prefix('*') {
        return format!("{{*{}}}", name);
    }
    segment.to_string()
}

/// Full path of a route for logs and error messages.
pub fn join(base: Option<&str>, route: &str) -> String {
    match base {
        None => route.to_string(),
        Some(base) if route == "/" => base.to_string(),
        Some(base) => format!("{}{}", base, route),
    }
}

/// Path with parameter and wildcard names erased (`/{id}` becomes `/{}`).
///
/// axum refuses two routes with the same shape but different names, even
/// under different verbs.
pub fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.starts_with("{*") && segment.ends_with('}') {
                "{*}"
            } else if segment.starts_with('{') && segment.ends_with('}') {
                "{}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
