//! Prompt templates offered to the agent

use std::collections::HashMap;

/// A named prompt with `{{argument}}` placeholders
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [&'static str],
    pub template: &'static str,
}

impl PromptTemplate {
    /// Substitute every `{{name}}`; arguments not supplied render empty
    pub fn render(&self, args: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    if let Some(value) = args.get(key) {
                        out.push_str(value);
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

pub const PROMPTS: &[PromptTemplate] = &[
    PromptTemplate {
        name: "제품 인증 정보 요청",
        description: "제품명이 식약처 인증 제품인지 확인",
        arguments: &["product_name"],
        template: "아래 제품명이 식약처 인증 제품인지 확인하고, 인증된 경우 업소명도 함께 알려주세요.\n\n제품명: {{product_name}}\n",
    },
    PromptTemplate {
        name: "판매자 분류 요청",
        description: "회사 정보로 외국계 기업 여부 예측",
        arguments: &["company", "ceo", "address"],
        template: "아래 회사 정보(회사명, 대표자명, 주소)를 바탕으로 외국계 기업 여부를 예측해 주세요.\n\n회사명: {{company}}\n대표자명: {{ceo}}\n주소: {{address}}\n",
    },
    PromptTemplate {
        name: "통합 제품/판매자 분석 요청",
        description: "제품 인증 여부와 판매자 분류를 함께 판별",
        arguments: &["product_name", "company", "ceo", "address"],
        template: "아래 정보를 바탕으로\n1) 제품이 식약처 인증 제품인지,\n2) 판매자가 외국계 기업인지\n각각 판별해 주세요.\n\n제품명: {{product_name}}\n회사명: {{company}}\n대표자명: {{ceo}}\n주소: {{address}}\n",
    },
    PromptTemplate {
        name: "이미지 분석 요청",
        description: "이미지 파일 분석 결과 요약",
        arguments: &["image_path"],
        template: "아래 이미지 파일을 분석해 주세요. 분석 결과를 요약해서 알려주세요.\n\n이미지 파일 경로: {{image_path}}\n",
    },
    PromptTemplate {
        name: "이미지 크롤링 요청",
        description: "웹페이지의 이미지 URL 목록 추출",
        arguments: &["page_url"],
        template: "아래 웹페이지에서 이미지 URL 목록을 모두 추출해 주세요.\n\n웹페이지 URL: {{page_url}}\n",
    },
    PromptTemplate {
        name: "셀레니움 이미지 다운로드 요청",
        description: "브라우저로 이미지 URL을 열어 저장",
        arguments: &["url", "save_path"],
        template: "아래 이미지 URL에 셀레니움으로 접속하여 이미지를 스크린샷으로 저장해 주세요.\n\n이미지 URL: {{url}}\n저장 경로(선택): {{save_path}}\n",
    },
    PromptTemplate {
        name: "웹페이지 이미지 일괄분석 요청",
        description: "웹페이지의 모든 이미지를 다운로드하여 분석",
        arguments: &["page_url"],
        template: "아래 웹페이지에서 이미지를 모두 추출하여 다운로드하고, 각 이미지를 분석해 결과를 요약해 주세요.\n\n웹페이지 URL: {{page_url}}\n",
    },
    PromptTemplate {
        name: "웹페이지 텍스트 추출 요청",
        description: "웹페이지의 주요 텍스트 추출",
        arguments: &["page_url"],
        template: "아래 웹페이지에서 주요 텍스트만 추출해 주세요.\n\n웹페이지 URL: {{page_url}}\n",
    },
    PromptTemplate {
        name: "웹페이지 텍스트(BS4) 추출 요청",
        description: "HTML 파싱으로 웹페이지의 주요 텍스트 추출",
        arguments: &["page_url"],
        template: "아래 웹페이지에서 주요 텍스트만 추출해 주세요. (BeautifulSoup 사용)\n\n웹페이지 URL: {{page_url}}\n",
    },
];

pub fn find(name: &str) -> Option<&'static PromptTemplate> {
    PROMPTS.iter().find(|p| p.name == name)
}
