use serde::{Deserialize, Serialize};

/// MediaHaven media object, reduced to the sections this service reads.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MediaObject {
    #[serde(default)]
    pub administrative: Option<Administrative>,
    #[serde(default)]
    pub technical: Option<Technical>,
    #[serde(default)]
    pub dynamic: Option<Dynamic>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Administrative {
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub organisation_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Technical {
    #[serde(default)]
    pub md5: Option<String>,
}

/// Free-form metadata; the S3 location keys are lower snake case.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dynamic {
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub s3_object_key: Option<String>,
}

impl MediaObject {
    pub fn external_id(&self) -> Option<&str> {
        self.administrative.as_ref()?.external_id.as_deref()
    }

    pub fn organisation_name(&self) -> Option<&str> {
        self.administrative.as_ref()?.organisation_name.as_deref()
    }

    pub fn md5(&self) -> Option<&str> {
        self.technical.as_ref()?.md5.as_deref()
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.dynamic.as_ref()?.s3_bucket.as_deref()
    }

    pub fn s3_object_key(&self) -> Option<&str> {
        self.dynamic.as_ref()?.s3_object_key.as_deref()
    }
}
