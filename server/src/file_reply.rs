use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

/// Raw file content served inline with a content type derived from its name.
pub struct FileReply {
    data: Vec<u8>,
    file_name: String,
}

impl FileReply {
    #[must_use]
    pub fn new(data: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            file_name: file_name.into(),
        }
    }

    fn content_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned()
    }
}

impl IntoResponse for FileReply {
    fn into_response(self) -> Response {
        let content_type = self.content_type();
        let len = self.data.len().to_string();
        let disposition = format!(r#"inline; filename="{}""#, self.file_name);
        let mut res = Body::from(self.data).into_response();
        if let Ok(val) = HeaderValue::from_str(&content_type) {
            res.headers_mut().insert(header::CONTENT_TYPE, val);
        }
        if let Ok(val) = HeaderValue::from_str(&disposition) {
            res.headers_mut().insert(header::CONTENT_DISPOSITION, val);
        }
        if let Ok(val) = HeaderValue::from_str(&len) {
            res.headers_mut().insert(header::CONTENT_LENGTH, val);
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a_1.png", "image/png")]
    #[case("a_1.jpg", "image/jpeg")]
    #[case("a_1.jpeg", "image/jpeg")]
    #[case("a_1.gif", "image/gif")]
    #[case("a_1.webp", "image/webp")]
    #[case("index.html", "text/html")]
    #[case("blob", "application/octet-stream")]
    #[trace]
    fn content_type_tests(#[case] file_name: &str, #[case] expected: &str) {
        // Arrange
        let reply = FileReply::new(Vec::new(), file_name);

        // Act
        let content_type = reply.content_type();

        // Assert
        assert_eq!(content_type, expected);
    }

    #[test]
    fn headers_are_set() {
        // Arrange
        let reply = FileReply::new(vec![1, 2, 3], "a_1.png");

        // Act
        let res = reply.into_response();

        // Assert
        let headers = res.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CONTENT_LENGTH], "3");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            r#"inline; filename="a_1.png""#
        );
    }
}
