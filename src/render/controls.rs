//! Built-in renderers, one per control type.

use super::{ChoiceStyle, ControlRenderer, Widget};
use crate::model::Field;
use ahash::AHashMap;

fn placeholder_or(field: &Field, fallback: &str) -> String {
    if field.placeholder.is_empty() {
        fallback.to_string()
    } else {
        field.placeholder.clone()
    }
}

macro_rules! define_control_renderers {
    ( $( ($struct_name:ident, $tag:expr, |$field:ident| $body:expr) ),* $(,)? ) => {
        $(
            struct $struct_name;
            impl ControlRenderer for $struct_name {
                fn kind(&self) -> &str { $tag }
                fn render(&self, $field: &Field) -> Widget { $body }
            }
        )*

        pub(super) fn register_default_renderers(
            registry: &mut AHashMap<String, Box<dyn ControlRenderer>>,
        ) {
            $( registry.insert($tag.to_string(), Box::new($struct_name)); )*
            for &(tag, caption, actions) in DEVICE_CONTROLS {
                registry.insert(tag.to_string(), Box::new(DeviceRenderer { tag, caption, actions }));
            }
            for &(tag, sections) in TEMPLATE_CONTROLS {
                registry.insert(tag.to_string(), Box::new(TemplateRenderer { tag, sections }));
            }
        }
    };
}

define_control_renderers! {
    (TextRenderer, "text", |field| Widget::Input {
        input_type: "text",
        placeholder: placeholder_or(field, "请输入文本"),
    }),
    (TextareaRenderer, "textarea", |field| Widget::TextArea {
        placeholder: placeholder_or(field, "请输入详细内容"),
        rows: 3,
    }),
    (NumberRenderer, "number", |field| Widget::Input {
        input_type: "number",
        placeholder: placeholder_or(field, "请输入数字"),
    }),
    (DateRenderer, "date", |_field| Widget::Input {
        input_type: "date",
        placeholder: String::new(),
    }),
    (TimeRenderer, "time", |_field| Widget::Input {
        input_type: "time",
        placeholder: String::new(),
    }),
    (DatetimeRenderer, "datetime", |_field| Widget::Input {
        input_type: "datetime-local",
        placeholder: String::new(),
    }),
    (SelectRenderer, "select", |field| Widget::Choice {
        style: ChoiceStyle::Select,
        options: field.options.clone(),
    }),
    (RadioRenderer, "radio", |field| Widget::Choice {
        style: ChoiceStyle::Radio,
        options: field.options.clone(),
    }),
    (CheckboxRenderer, "checkbox", |field| Widget::Choice {
        style: ChoiceStyle::Checkbox,
        options: field.options.clone(),
    }),
    (SwitchRenderer, "switch", |field| Widget::Switch {
        on: field.default_value == "true",
    }),
    (FileRenderer, "file", |field| Widget::Upload {
        accept: "*",
        caption: placeholder_or(field, "点击上传文件"),
    }),
    (ImageRenderer, "image", |field| Widget::Upload {
        accept: "image/*",
        caption: placeholder_or(field, "点击上传图片"),
    }),
    (DividerRenderer, "divider", |field| Widget::Divider {
        text: if field.label.is_empty() { "分割线".to_string() } else { field.label.clone() },
    }),
}

/// `(tag, preview caption, buttons)`
const DEVICE_CONTROLS: &[(&str, &str, &[&str])] = &[
    ("qrcode", "二维码", &[]),
    ("sms", "请输入手机号", &["获取验证码"]),
    ("ai", "请输入您的问题", &["发送给AI助手"]),
    ("camera", "摄像头预览区域", &["开启摄像头", "拍照"]),
    ("ocr", "上传图片进行文字识别", &["开始识别"]),
    ("signature", "请在此处签名", &["清除", "确认"]),
    ("map", "地图区域", &["获取当前位置"]),
    ("barcode", "条形码", &["扫描条形码"]),
    ("video", "视频预览区域", &["开始录制"]),
    ("audio", "音频录制", &["开始录音"]),
    ("digital_sign", "数字证书签名", &["选择证书", "签名"]),
    ("biometric", "生物识别", &["指纹识别", "人脸识别"]),
];

/// `(tag, section headings)`
const TEMPLATE_CONTROLS: &[(&str, &[&str])] = &[
    ("subform", &["子表单"]),
    ("table", &["表格"]),
    ("recruitment", &["职位信息", "任职要求"]),
    ("attendance", &["打卡信息", "定位"]),
    ("leave", &["请假信息", "工作安排"]),
    ("expense", &["报销信息", "费用明细"]),
    ("purchase", &["采购信息", "物品清单"]),
    ("meeting", &["会议信息", "参会人员"]),
    ("travel", &["出差信息", "行程安排"]),
    ("performance", &["考核周期", "工作目标", "自评"]),
    ("training", &["培训信息", "报名信息"]),
    ("equipment", &["设备信息", "领用信息"]),
    ("visitor", &["访客信息", "来访事由"]),
    ("contract", &["合同信息", "签约方", "付款条款"]),
    ("project", &["项目信息", "项目成员"]),
    ("assessment", &["考核项目", "评分"]),
];

/// Hardware or service backed controls: a preview box plus action buttons.
struct DeviceRenderer {
    tag: &'static str,
    caption: &'static str,
    actions: &'static [&'static str],
}

impl ControlRenderer for DeviceRenderer {
    fn kind(&self) -> &str {
        self.tag
    }

    fn render(&self, _field: &Field) -> Widget {
        Widget::Device {
            caption: self.caption.to_string(),
            actions: self.actions.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Business templates made of several titled sections.
struct TemplateRenderer {
    tag: &'static str,
    sections: &'static [&'static str],
}

impl ControlRenderer for TemplateRenderer {
    fn kind(&self) -> &str {
        self.tag
    }

    fn render(&self, field: &Field) -> Widget {
        // Subforms and tables list their own columns when configured.
        let columns = field
            .properties
            .get("columns")
            .and_then(|c| c.as_array())
            .map(|cols| {
                cols.iter()
                    .filter_map(|c| c.as_str().map(str::to_string))
                    .collect::<Vec<_>>()
            })
            .filter(|cols| !cols.is_empty());
        Widget::Sections {
            sections: columns
                .unwrap_or_else(|| self.sections.iter().map(|s| s.to_string()).collect()),
        }
    }
}
