use std::future::{ready, Ready};
use std::ops::Deref;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};

/// 토큰으로 인증된 주체
///
/// 인증 미들웨어가 요청 시작 시점에 해석한 주체를 Request Extensions에 저장하며,
/// 핸들러는 이 추출자로 꺼내 씁니다. 주체가 없으면 401을 반환합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated<T>(pub T);

impl<T> Authenticated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Authenticated<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// ActixWeb FromRequest trait 구현
impl<T: Clone + 'static> FromRequest for Authenticated<T> {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Authenticated<T>>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(actix_web::error::ErrorUnauthorized(
                "인증되지 않은 요청입니다"
            ))),
        }
    }
}

/// 선택적 인증 주체 추출자
#[derive(Debug, Clone)]
pub struct OptionalAuthenticated<T>(pub Option<T>);

impl<T: Clone + 'static> FromRequest for OptionalAuthenticated<T> {
    type Error = Error;
    type Future = Ready<actix_web::Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let user = req.extensions().get::<Authenticated<T>>().map(|u| u.0.clone());
        ready(Ok(OptionalAuthenticated(user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_authenticated_extracts_from_extensions() {
        let req = TestRequest::default().to_http_request();
        req.extensions_mut().insert(Authenticated("user-1".to_string()));

        let user = Authenticated::<String>::extract(&req).await.unwrap();
        assert_eq!(user.as_str(), "user-1");
    }

    #[actix_web::test]
    async fn test_authenticated_missing_is_unauthorized() {
        let req = TestRequest::default().to_http_request();

        let err = Authenticated::<String>::extract(&req).await.unwrap_err();
        assert_eq!(err.as_response_error().status_code(), actix_web::http::StatusCode::UNAUTHORIZED);

        let optional = OptionalAuthenticated::<String>::extract(&req).await.unwrap();
        assert!(optional.0.is_none());
    }
}
