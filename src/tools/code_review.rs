//! `code-review` prompt

use std::collections::HashMap;

use crate::mcp::registry::PromptProvider;
use crate::mcp::types::{GetPromptResult, PromptArgument, PromptDescriptor, PromptMessage};

const CODE_PLACEHOLDER: &str = "```\n{code}";

const TEMPLATE: &str = "다음 코드를 리뷰해주세요. 다음 항목들을 중점적으로 확인해주세요:

## 리뷰 체크리스트

### 1. 코드 품질
- [ ] 코드 가독성과 명확성
- [ ] 네이밍 컨벤션 준수
- [ ] 코드 중복 여부
- [ ] 적절한 주석 및 문서화

### 2. 기능성
- [ ] 요구사항 충족 여부
- [ ] 엣지 케이스 처리
- [ ] 에러 핸들링
- [ ] 로직의 정확성

### 3. 성능
- [ ] 알고리즘 효율성
- [ ] 불필요한 연산 제거
- [ ] 메모리 사용 최적화

### 4. 보안
- [ ] 입력 검증
- [ ] 보안 취약점
- [ ] 민감 정보 처리

### 5. 유지보수성
- [ ] 모듈화 및 재사용성
- [ ] 테스트 가능성
- [ ] 확장 가능성

## 리뷰할 코드

```
{code}
```

위 코드에 대한 상세한 리뷰를 제공해주세요. 개선 사항이 있다면 구체적인 예시와 함께 제안해주세요.";

/// Fill the review template. The code is inserted verbatim; `language` tags
/// the opening fence and `context` is appended as its own section.
pub fn review_prompt(code: &str, language: Option<&str>, context: Option<&str>) -> String {
    let fence = match language.filter(|l| !l.is_empty()) {
        Some(language) => format!("```{}\n{}", language, code),
        None => format!("```\n{}", code),
    };

    let mut prompt = TEMPLATE.replacen(CODE_PLACEHOLDER, &fence, 1);

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("\n\n## 추가 맥락\n{}\n", context));
    }
    prompt
}

pub struct CodeReviewPrompt;

impl PromptProvider for CodeReviewPrompt {
    fn descriptor(&self) -> PromptDescriptor {
        PromptDescriptor {
            name: "code-review".to_string(),
            title: Some("코드 리뷰".to_string()),
            description: "코드를 입력받아서 코드 리뷰를 위한 프롬프트 템플릿과 결합하여 반환합니다."
                .to_string(),
            arguments: vec![
                PromptArgument {
                    name: "code".to_string(),
                    description: "리뷰할 코드".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "language".to_string(),
                    description: "프로그래밍 언어 (예: typescript, javascript, python 등)"
                        .to_string(),
                    required: false,
                },
                PromptArgument {
                    name: "context".to_string(),
                    description: "코드의 맥락이나 목적에 대한 추가 설명".to_string(),
                    required: false,
                },
            ],
        }
    }

    fn render(&self, arguments: &HashMap<String, String>) -> GetPromptResult {
        let code = arguments.get("code").map(String::as_str).unwrap_or_default();
        let text = review_prompt(
            code,
            arguments.get("language").map(String::as_str),
            arguments.get("context").map(String::as_str),
        );

        GetPromptResult {
            description: Some("코드 리뷰를 위한 프롬프트".to_string()),
            messages: vec![PromptMessage::user_text(text)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::types::{PromptContent, Role};

    #[test]
    fn test_plain_fence() {
        let prompt = review_prompt("fn main() {}", None, None);
        assert!(prompt.contains("## 리뷰할 코드\n\n```\nfn main() {}\n```\n\n위 코드에 대한"));
        assert!(!prompt.contains("{code}"));
        assert!(!prompt.contains("## 추가 맥락"));
    }

    #[test]
    fn test_language_tag_and_context() {
        let prompt = review_prompt("print(1)", Some("python"), Some("학습용 예제"));
        assert!(prompt.contains("```python\nprint(1)\n```"));
        assert!(prompt.ends_with("\n\n## 추가 맥락\n학습용 예제\n"));
    }

    #[test]
    fn test_checklist_sections() {
        let prompt = review_prompt("x", None, None);
        for section in ["### 1. 코드 품질", "### 3. 성능", "### 5. 유지보수성"] {
            assert!(prompt.contains(section));
        }
    }

    #[test]
    fn test_render_single_user_message() {
        let args = HashMap::from([("code".to_string(), "let x = 1;".to_string())]);
        let result = CodeReviewPrompt.render(&args);

        assert_eq!(result.description.as_deref(), Some("코드 리뷰를 위한 프롬프트"));
        assert_eq!(result.messages.len(), 1);
        assert_eq!(result.messages[0].role, Role::User);
        let PromptContent::Text { text } = &result.messages[0].content;
        assert!(text.contains("let x = 1;"));
    }
}
