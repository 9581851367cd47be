/// 인증 모드를 정의하는 열거형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// 인증이 반드시 필요함 (실패 시 401)
    Required,
    /// 인증이 선택사항임 (있으면 검증, 없어도 허용)
    Optional,
}
