//! DSA 信封格式
//!
//! 请求：`Envelope/Header`（合约、服务名、会话）+ `Envelope/Body`（请求元素）
//! 回应：`Envelope/Header/Status/Code` 为 0 表示成功，`Body` 中第一个元素即结果

use crate::error::{AppResult, RpcError};
use crate::infrastructure::xml::XmlElement;

/// 成功状态码
pub const SUCCESS_CODE: &str = "0";

/// 构建请求信封
pub fn build_request(contract: &str, token: &str, service: &str, body: XmlElement) -> XmlElement {
    let header = XmlElement::new("Header")
        .with_child(XmlElement::new("TargetContract").with_text(contract))
        .with_child(XmlElement::new("TargetService").with_text(service))
        .with_child(
            XmlElement::new("SecurityToken")
                .with_attribute("Type", "Session")
                .with_child(XmlElement::new("SessionID").with_text(token)),
        );

    XmlElement::new("Envelope")
        .with_child(header)
        .with_child(XmlElement::new("Body").with_child(body))
}

/// 解析回应信封，返回 Body 中的结果元素
///
/// 状态码非 0 时回传 `ServiceFault`；Body 为空时回传空的 `<Response/>`。
pub fn parse_response(service: &str, raw: &str) -> AppResult<XmlElement> {
    let envelope = XmlElement::parse(raw)?;
    if envelope.name() != "Envelope" {
        return Err(RpcError::MalformedResponse {
            service: service.to_string(),
            detail: format!("根元素为 <{}>，预期 <Envelope>", envelope.name()),
        }
        .into());
    }

    let status = envelope.path("Header/Status");
    let code = status
        .and_then(|s| s.child_text("Code"))
        .ok_or_else(|| RpcError::MalformedResponse {
            service: service.to_string(),
            detail: "缺少 Header/Status/Code".to_string(),
        })?;

    if code != SUCCESS_CODE {
        let message = status
            .and_then(|s| s.child_text("Message"))
            .unwrap_or_default();
        return Err(RpcError::ServiceFault {
            service: service.to_string(),
            code,
            message,
        }
        .into());
    }

    Ok(envelope
        .child("Body")
        .and_then(|body| body.elements().next())
        .cloned()
        .unwrap_or_else(|| XmlElement::new("Response")))
}
