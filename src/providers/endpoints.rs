//! Provider endpoint constants.

/// DeepSeek balance endpoint.
pub const DEEPSEEK_BALANCE_URL: &str = "https://api.deepseek.com/user/balance";

/// OpenRouter credits endpoint.
pub const OPENROUTER_CREDITS_URL: &str = "https://openrouter.ai/api/v1/credits";

/// Aliyun BSS OpenAPI endpoint, also used for unknown regions.
pub const ALIYUN_DEFAULT_ENDPOINT: &str = "https://business.aliyuncs.com";

/// Aliyun BSS OpenAPI protocol constants.
pub mod aliyun {
    /// Balance query action.
    pub const ACTION: &str = "QueryAccountBalance";
    /// BSS OpenAPI version.
    pub const API_VERSION: &str = "2017-12-14";
    /// Signature algorithm name.
    pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
    /// Signature protocol version.
    pub const SIGNATURE_VERSION: &str = "1.0";
    /// Response format.
    pub const FORMAT: &str = "JSON";
    /// Region suggested to users who have not picked one.
    pub const DEFAULT_REGION: &str = "cn-hangzhou";
}

/// An Aliyun region and the BSS host serving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Region id (e.g., "cn-hangzhou")
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    /// BSS host, without scheme
    pub host: &'static str,
}

const CN_HOST: &str = "business.aliyuncs.com";
const INTL_HOST: &str = "business.ap-southeast-1.aliyuncs.com";

/// Regions with a known BSS endpoint.
pub const REGIONS: &[Region] = &[
    Region { id: "cn-hangzhou", name: "China East 1 (Hangzhou)", host: CN_HOST },
    Region { id: "cn-beijing", name: "China North 2 (Beijing)", host: CN_HOST },
    Region { id: "cn-shanghai", name: "China East 2 (Shanghai)", host: CN_HOST },
    Region { id: "cn-shenzhen", name: "China South 1 (Shenzhen)", host: CN_HOST },
    Region { id: "cn-qingdao", name: "China North 1 (Qingdao)", host: CN_HOST },
    Region { id: "cn-zhangjiakou", name: "China North 3 (Zhangjiakou)", host: CN_HOST },
    Region { id: "cn-huhehaote", name: "China North 5 (Hohhot)", host: CN_HOST },
    Region { id: "cn-wulanchabu", name: "China North 6 (Ulanqab)", host: CN_HOST },
    Region { id: "cn-chengdu", name: "China Southwest 1 (Chengdu)", host: CN_HOST },
    Region { id: "cn-hongkong", name: "China (Hong Kong)", host: CN_HOST },
    Region { id: "ap-southeast-1", name: "Singapore", host: INTL_HOST },
    Region { id: "ap-northeast-1", name: "Japan (Tokyo)", host: INTL_HOST },
    Region { id: "ap-southeast-2", name: "Australia (Sydney)", host: INTL_HOST },
    Region { id: "ap-southeast-3", name: "Malaysia (Kuala Lumpur)", host: INTL_HOST },
    Region { id: "ap-southeast-5", name: "Indonesia (Jakarta)", host: INTL_HOST },
    Region { id: "ap-south-1", name: "India (Mumbai)", host: INTL_HOST },
    Region { id: "us-west-1", name: "US (Silicon Valley)", host: INTL_HOST },
    Region { id: "us-east-1", name: "US (Virginia)", host: INTL_HOST },
    Region { id: "eu-west-1", name: "UK (London)", host: INTL_HOST },
    Region { id: "eu-central-1", name: "Germany (Frankfurt)", host: INTL_HOST },
    Region { id: "me-east-1", name: "UAE (Dubai)", host: INTL_HOST },
];

/// Find a known region by id.
pub fn region(id: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.id == id)
}

/// Resolve the BSS endpoint for a region, falling back to the default endpoint.
pub fn aliyun_endpoint_for_region(region_id: &str) -> String {
    match region(region_id) {
        Some(region) => format!("https://{}", region.host),
        None => ALIYUN_DEFAULT_ENDPOINT.to_string(),
    }
}

/// Human-readable region name, or the id itself when unknown.
pub fn region_name(region_id: &str) -> &str {
    region(region_id).map_or(region_id, |r| r.name)
}
