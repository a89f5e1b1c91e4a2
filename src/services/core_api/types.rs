//! Core API value objects and wire envelopes.
//!
//! Wire names are lower_snake_case; unknown fields are tolerated and `None`
//! fields are never sent.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity issued by the external DID provider (COR-112).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DidMemberDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_member_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

/// Local membership record (COR-001). Fields the Core API adds later are kept
/// in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SppMemberDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_member_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<&DidMemberDetails> for SppMemberDetails {
    fn from(did: &DidMemberDetails) -> Self {
        Self {
            member_name: did.member_name.clone(),
            email_address: did.email_address.clone(),
            birthday: did.birthday.clone(),
            gender: did.gender.clone(),
            nickname: did.nickname.clone(),
            did_member_id: did.did_member_id.clone(),
            extra: Map::new(),
        }
    }
}

/// `spp_member_register` envelope of a COR-001 request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SppMemberRegister {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fresh_for_iur: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fresh_for_did: Option<bool>,
    pub spp_member_details: SppMemberDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdm_agreement: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_activate_flag: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct Cor001Request<'a> {
    pub spp_member_register: &'a SppMemberRegister,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Cor001Response {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub spp_member_details: Option<SppMemberDetails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Cor001ErrorResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Cor112Response {
    #[serde(default)]
    pub did_member_details: Option<DidMemberDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_envelope_omits_unset_fields() {
        let register = SppMemberRegister {
            is_fresh_for_did: Some(true),
            spp_member_details: SppMemberDetails {
                member_name: Some("mickey".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let body = serde_json::to_value(Cor001Request {
            spp_member_register: &register,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "spp_member_register": {
                    "is_fresh_for_did": true,
                    "spp_member_details": {"member_name": "mickey"}
                }
            })
        );
    }

    #[test]
    fn member_details_keep_unknown_fields() {
        let details: SppMemberDetails = serde_json::from_value(json!({
            "member_name": "mickey",
            "member_status": "active",
            "points": 3
        }))
        .unwrap();

        assert_eq!(details.member_name.as_deref(), Some("mickey"));
        assert_eq!(details.extra.get("member_status"), Some(&json!("active")));

        let echoed = serde_json::to_value(&details).unwrap();
        assert_eq!(echoed["points"], json!(3));
    }

    #[test]
    fn did_lookup_ignores_unknown_fields() {
        let res: Cor112Response = serde_json::from_value(json!({
            "did_member_details": {"did_member_id": "d-1", "favorite_park": "sea"},
            "trace_id": "x"
        }))
        .unwrap();

        assert_eq!(
            res.did_member_details.unwrap().did_member_id.as_deref(),
            Some("d-1")
        );
    }
}
