use crate::common::CnamePolicy;

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct Config {
    /// Never treat CNAME records as unchanged, rewriting them on every run.
    #[serde(default)]
    pub replace_cnames: bool,
}

impl Config {
    pub fn cname_policy(&self) -> CnamePolicy {
        match self.replace_cnames {
            true => CnamePolicy::AlwaysReplace,
            false => CnamePolicy::Compare,
        }
    }
}
