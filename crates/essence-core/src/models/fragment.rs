use std::fmt;

/// Metadata fields required before a notification can be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Pid,
    Md5,
    S3Bucket,
    S3ObjectKey,
}

impl MetadataField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataField::Pid => "pid",
            MetadataField::Md5 => "md5",
            MetadataField::S3Bucket => "s3_bucket",
            MetadataField::S3ObjectKey => "s3_object_key",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required metadata fields that were absent or empty, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<MetadataField>);

impl MissingFields {
    pub fn fields(&self) -> &[MetadataField] {
        &self.0
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(MetadataField::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

/// Complete metadata for one fragment. All four fields are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentMetadata {
    pid: String,
    md5: String,
    s3_bucket: String,
    s3_object_key: String,
}

impl FragmentMetadata {
    /// Build metadata, reporting every missing field.
    ///
    /// Empty values count as missing; a partially filled record is never built.
    pub fn try_new(
        pid: Option<String>,
        md5: Option<String>,
        s3_bucket: Option<String>,
        s3_object_key: Option<String>,
    ) -> Result<Self, MissingFields> {
        fn required(value: Option<String>, field: MetadataField) -> Result<String, MetadataField> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v),
                _ => Err(field),
            }
        }

        match (
            required(pid, MetadataField::Pid),
            required(md5, MetadataField::Md5),
            required(s3_bucket, MetadataField::S3Bucket),
            required(s3_object_key, MetadataField::S3ObjectKey),
        ) {
            (Ok(pid), Ok(md5), Ok(s3_bucket), Ok(s3_object_key)) => Ok(Self {
                pid,
                md5,
                s3_bucket,
                s3_object_key,
            }),
            (pid, md5, s3_bucket, s3_object_key) => Err(MissingFields(
                [pid.err(), md5.err(), s3_bucket.err(), s3_object_key.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }

    pub fn pid(&self) -> &str {
        &self.pid
    }

    pub fn md5(&self) -> &str {
        &self.md5
    }

    pub fn s3_bucket(&self) -> &str {
        &self.s3_bucket
    }

    pub fn s3_object_key(&self) -> &str {
        &self.s3_object_key
    }
}
