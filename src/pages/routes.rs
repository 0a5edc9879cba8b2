use url::form_urlencoded::byte_serialize;

fn encode_segment(id: &str) -> String {
    // form encoding writes spaces as `+`, which a path would keep literally
    byte_serialize(id.as_bytes()).collect::<String>().replace('+', "%20")
}

pub fn image_path(id: &str) -> String {
    format!("/images/{}", encode_segment(id))
}

/// Opening an image through this path counts a view.
pub fn image_open_path(id: &str) -> String {
    format!("{}/open", image_path(id))
}

pub fn like_path(id: &str) -> String {
    format!("{}/like", image_path(id))
}
