use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddConnectionForm {
    pub name: String,
    pub server: String,
    pub db_name: String,
}

/// Body of the delete and select forms.
#[derive(Debug, Deserialize)]
pub struct ConnectionNameForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryForm {
    pub sql: String,
}

/// Query string of `GET /hops`. At most one selector is used; see
/// [`crate::hop::HopSelector::from_params`] for precedence.
#[derive(Debug, Default, Deserialize)]
pub struct HopsParams {
    pub by_v_id: Option<String>,
    pub by_v_label_en: Option<String>,
    pub by_like_v_label_en: Option<String>,
    /// Kept as text so a bad value is reported by the handler as JSON.
    pub limit: Option<String>,
}
