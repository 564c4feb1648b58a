//! MIME 类型辅助函数

/// 目录条目的 MIME 类型
pub const DIRECTORY_MIME: &str = "inode/directory";

/// 去掉 `;` 之后的参数，如 `text/plain; charset=utf-8` -> `text/plain`
pub fn essence(mime_type: &str) -> &str {
    mime_type
        .split_once(';')
        .map_or(mime_type, |(essence, _)| essence)
        .trim()
}

/// 检查 MIME 类型格式（type/subtype，允许附带参数）
pub fn is_valid_mime_type(mime_type: &str) -> bool {
    let Some((kind, subtype)) = essence(mime_type).split_once('/') else {
        return false;
    };
    let valid_token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-".contains(c))
    };
    valid_token(kind) && valid_token(subtype)
}

/// 根据文件扩展名推断 MIME 类型
pub fn mime_type_for_name(file_name: &str) -> String {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    };

    match ext.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// 将选择器的 MIME 模式转换为扩展名过滤器
///
/// 包含 "*/*" 时返回空列表，表示不过滤。
pub fn extensions_for_patterns(patterns: &[String]) -> Vec<&'static str> {
    let mut extensions = Vec::new();
    for pattern in patterns {
        let matched: &[&'static str] = match pattern.as_str() {
            "*/*" | "*" => return Vec::new(),
            "text/*" => &["txt", "log", "md"],
            "text/plain" => &["txt", "log"],
            "text/markdown" => &["md"],
            "image/*" => &["png", "jpg", "jpeg", "gif", "webp"],
            "image/png" => &["png"],
            "image/jpeg" => &["jpg", "jpeg"],
            "application/json" => &["json"],
            "application/pdf" => &["pdf"],
            "audio/*" => &["mp3", "wav"],
            "video/*" => &["mp4"],
            _ => &[],
        };
        for ext in matched {
            if !extensions.contains(ext) {
                extensions.push(*ext);
            }
        }
    }
    extensions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_mime_types() {
        assert!(is_valid_mime_type("text/plain"));
        assert!(is_valid_mime_type("image/png"));
        assert!(is_valid_mime_type("application/vnd.ms-excel"));
        assert!(is_valid_mime_type(DIRECTORY_MIME));
        assert!(!is_valid_mime_type("text"));
        assert!(!is_valid_mime_type("/plain"));
        assert!(!is_valid_mime_type("text/"));
        assert!(is_valid_mime_type("text/plain; charset=utf-8"));
        assert!(is_valid_mime_type("text/plain;charset=UTF-8"));
        assert!(!is_valid_mime_type("; charset=utf-8"));
        assert!(!is_valid_mime_type("text plain; charset=utf-8"));
    }

    #[test]
    fn test_essence() {
        assert_eq!(essence("text/plain; charset=utf-8"), "text/plain");
        assert_eq!(essence(" image/png "), "image/png");
    }

    #[test]
    fn test_mime_type_for_name() {
        assert_eq!(mime_type_for_name("errors.txt"), "text/plain");
        assert_eq!(mime_type_for_name("img.PNG"), "image/png");
        assert_eq!(mime_type_for_name("README"), "application/octet-stream");
    }

    #[test]
    fn test_extensions_for_patterns() {
        assert!(extensions_for_patterns(&["*/*".to_string()]).is_empty());
        assert_eq!(
            extensions_for_patterns(&["image/png".to_string(), "image/*".to_string()]),
            vec!["png", "jpg", "jpeg", "gif", "webp"]
        );
        assert!(extensions_for_patterns(&["x-unknown/thing".to_string()]).is_empty());
    }
}
