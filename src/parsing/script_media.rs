use once_cell::sync::Lazy;
use regex::Regex;

use super::dom::{Element, Node};

// `ShowPictureQ2WH('archive.zip','preview.gif', w, h)` and `ShowPictureQ('picture.gif')`.
static IMAGE_AND_ARCHIVE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ShowPictureQ2WH\('([^']*)','([^']*)'").expect("valid regex"));
static IMAGE_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ShowPictureQ\('([^']+)'").expect("valid regex"));

/// One recognized media call inside a script body.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRef {
    ImageRef { image: String },
    ImageAndArchiveRef { archive: String, image: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptMedia {
    Recognized(Vec<MediaRef>),
    Unrecognized,
}

/// Classifies a script body by the picture helpers the question bank uses.
pub fn classify_script(body: &str) -> ScriptMedia {
    let mut calls = Vec::new();

    for caps in IMAGE_AND_ARCHIVE_CALL.captures_iter(body) {
        calls.push(MediaRef::ImageAndArchiveRef {
            archive: caps[1].to_string(),
            image: caps[2].to_string(),
        });
    }
    for caps in IMAGE_CALL.captures_iter(body) {
        calls.push(MediaRef::ImageRef {
            image: caps[1].to_string(),
        });
    }

    if calls.is_empty() {
        ScriptMedia::Unrecognized
    } else {
        ScriptMedia::Recognized(calls)
    }
}

/// Counts of synthesized markup, split by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaMarkupCounts {
    pub images: usize,
    pub archive_links: usize,
}

/// Markup that stands in for a script, in document order.
pub fn media_markup(calls: &[MediaRef], asset_prefix: &str) -> (Vec<Node>, MediaMarkupCounts) {
    let mut nodes = Vec::new();
    let mut counts = MediaMarkupCounts::default();

    for call in calls {
        match call {
            MediaRef::ImageRef { image } => {
                nodes.push(image_node(asset_prefix, image));
                counts.images += 1;
            }
            MediaRef::ImageAndArchiveRef { archive, image } => {
                if !archive.is_empty() {
                    let link = Element::new("a")
                        .with_attr("href", format!("{asset_prefix}{archive}"))
                        .with_child(Node::text(archive.as_str()));
                    nodes.push(link.into_node());
                    counts.archive_links += 1;
                }
                if !image.is_empty() {
                    nodes.push(image_node(asset_prefix, image));
                    counts.images += 1;
                }
            }
        }
    }

    (nodes, counts)
}

fn image_node(asset_prefix: &str, image: &str) -> Node {
    Element::new("img")
        .with_attr("src", format!("{asset_prefix}{image}"))
        .with_attr("alt", "")
        .into_node()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_picture_call() {
        let media = classify_script("ShowPictureQ('09DBE5.gif')");
        assert_eq!(
            media,
            ScriptMedia::Recognized(vec![MediaRef::ImageRef {
                image: "09DBE5.gif".to_string()
            }])
        );
    }

    #[test]
    fn test_picture_with_archive_call() {
        let media = classify_script("ShowPictureQ2WH('task.zip','task.gif', 120, 40);");
        assert_eq!(
            media,
            ScriptMedia::Recognized(vec![MediaRef::ImageAndArchiveRef {
                archive: "task.zip".to_string(),
                image: "task.gif".to_string(),
            }])
        );
    }

    #[test]
    fn test_unknown_script() {
        assert_eq!(classify_script("var x = 1;"), ScriptMedia::Unrecognized);
        assert_eq!(classify_script("ShowPictureQ('')"), ScriptMedia::Unrecognized);
    }

    #[test]
    fn test_markup_puts_archive_link_before_image() {
        let calls = vec![MediaRef::ImageAndArchiveRef {
            archive: "t.zip".to_string(),
            image: "t.gif".to_string(),
        }];
        let (nodes, counts) = media_markup(&calls, "assets/");
        let html: String = nodes
            .iter()
            .map(|node| node.as_element().unwrap().to_html())
            .collect();
        assert_eq!(
            html,
            r#"<a href="assets/t.zip">t.zip</a><img alt="" src="assets/t.gif">"#
        );
        assert_eq!(
            counts,
            MediaMarkupCounts {
                images: 1,
                archive_links: 1
            }
        );
    }

    #[test]
    fn test_markup_skips_empty_arguments() {
        let calls = vec![MediaRef::ImageAndArchiveRef {
            archive: String::new(),
            image: "only.gif".to_string(),
        }];
        let (nodes, counts) = media_markup(&calls, "assets/");
        assert_eq!(nodes.len(), 1);
        assert_eq!(counts.archive_links, 0);
    }
}
