use std::fmt;

macro_rules! field_kinds {
    ($($variant:ident => $tag:literal, $label:literal, $placeholder:literal;)*) => {
        /// Every control type the designers know about.
        ///
        /// Serialized as its wire tag (`"text"`, `"digital_sign"`, ...). Tags that
        /// are not listed here survive a round trip as `Custom`.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum FieldKind {
            $($variant,)*
            Custom(String),
        }

        impl FieldKind {
            /// All built-in kinds, in toolbar order.
            pub const BUILTIN: &'static [FieldKind] = &[$(FieldKind::$variant,)*];

            pub fn as_str(&self) -> &str {
                match self {
                    $(FieldKind::$variant => $tag,)*
                    FieldKind::Custom(tag) => tag,
                }
            }

            pub fn from_tag(tag: &str) -> Self {
                match tag {
                    $($tag => FieldKind::$variant,)*
                    other => FieldKind::Custom(other.to_string()),
                }
            }

            /// Label given to a freshly added field of this kind.
            pub fn default_label(&self) -> &str {
                match self {
                    $(FieldKind::$variant => $label,)*
                    FieldKind::Custom(tag) => tag,
                }
            }

            pub fn default_placeholder(&self) -> &str {
                match self {
                    $(FieldKind::$variant => $placeholder,)*
                    FieldKind::Custom(_) => "",
                }
            }
        }
    };
}

field_kinds! {
    Text => "text", "单行文本", "请输入文本";
    Textarea => "textarea", "多行文本", "请输入详细内容";
    Number => "number", "数字", "请输入数字";
    Date => "date", "日期", "";
    Time => "time", "时间", "";
    Datetime => "datetime", "日期时间", "";
    Select => "select", "下拉选择", "请选择";
    Radio => "radio", "单选框组", "";
    Checkbox => "checkbox", "复选框组", "";
    Switch => "switch", "开关", "";
    File => "file", "文件上传", "点击上传文件";
    Image => "image", "图片上传", "点击上传图片";
    Divider => "divider", "分隔线", "";
    Qrcode => "qrcode", "二维码", "";
    Sms => "sms", "短信验证", "请输入手机号";
    Ai => "ai", "AI助手", "请输入问题";
    Camera => "camera", "拍照", "";
    Ocr => "ocr", "文字识别", "";
    Signature => "signature", "手写签名", "";
    Map => "map", "地图定位", "请选择位置";
    Barcode => "barcode", "条形码", "";
    Video => "video", "视频", "";
    Audio => "audio", "音频", "";
    DigitalSign => "digital_sign", "数字签名", "";
    Biometric => "biometric", "生物识别", "";
    Subform => "subform", "子表单", "";
    Table => "table", "表格", "";
    Recruitment => "recruitment", "招聘申请", "";
    Attendance => "attendance", "考勤打卡", "";
    Leave => "leave", "请假申请", "";
    Expense => "expense", "费用报销", "";
    Purchase => "purchase", "采购申请", "";
    Meeting => "meeting", "会议预约", "";
    Travel => "travel", "出差申请", "";
    Performance => "performance", "绩效评估", "";
    Training => "training", "培训报名", "";
    Equipment => "equipment", "设备申领", "";
    Visitor => "visitor", "访客登记", "";
    Contract => "contract", "合同审批", "";
    Project => "project", "项目立项", "";
    Assessment => "assessment", "考核评分", "";
}

impl FieldKind {
    /// Kinds whose value is picked from `options`.
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Radio | FieldKind::Checkbox)
    }

    /// Kinds that can appear in a logic rule condition or target.
    pub fn is_rule_target(&self) -> bool {
        !matches!(self, FieldKind::Divider | FieldKind::File | FieldKind::Image)
    }

    /// Whole business templates that bundle several inputs.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            FieldKind::Subform
                | FieldKind::Table
                | FieldKind::Recruitment
                | FieldKind::Attendance
                | FieldKind::Leave
                | FieldKind::Expense
                | FieldKind::Purchase
                | FieldKind::Meeting
                | FieldKind::Travel
                | FieldKind::Performance
                | FieldKind::Training
                | FieldKind::Equipment
                | FieldKind::Visitor
                | FieldKind::Contract
                | FieldKind::Project
                | FieldKind::Assessment
        )
    }

    pub fn default_options(&self) -> Vec<String> {
        if self.is_choice() {
            vec!["选项1".to_string(), "选项2".to_string(), "选项3".to_string()]
        } else {
            Vec::new()
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FieldKind {
    fn from(tag: String) -> Self {
        FieldKind::from_tag(&tag)
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        kind.as_str().to_string()
    }
}

impl serde::Serialize for FieldKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for FieldKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(FieldKind::from_tag(&tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for kind in FieldKind::BUILTIN {
            assert_eq!(&FieldKind::from_tag(kind.as_str()), kind);
        }
        assert_eq!(FieldKind::BUILTIN.len(), 41);
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let kind: FieldKind = serde_json::from_str("\"rating\"").unwrap();
        assert_eq!(kind, FieldKind::Custom("rating".to_string()));
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"rating\"");
    }

    #[test]
    fn only_choice_kinds_get_default_options() {
        assert_eq!(FieldKind::Radio.default_options().len(), 3);
        assert!(FieldKind::Text.default_options().is_empty());
    }
}
