//! Prompt templates.
//!
//! Two groups live here: the content-type templates of the single-shot
//! content page (`expand`), and the fixed instructions of the course
//! pipeline (meta-prompt, outline, structure, lesson, quiz, modification).
//! Templates use `{name}` placeholders; unknown placeholders are left as-is.

use common::model::content::ContentOptions;
use common::model::course::CourseForm;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

/// Content-type label -> template, in the order they are offered.
const CONTENT_TEMPLATES: &[(&str, &str)] = &[
    (
        "课程大纲",
        "你是一位经验丰富的课程设计师。请根据以下要求，为一门课程设计一个详细、结构化的大纲。
- 课程主题: {user_input}
- 学科领域: {subject}
- 目标学员水平: {edu_level}
- 要求: 大纲需要包含合理的模块划分，每个模块下有具体的章节或知识点。逻辑清晰，层层递进。请使用Markdown格式输出。",
    ),
    (
        "教学PPT",
        "你是一位PPT制作专家。请根据以下主题，生成一份教学PPT的核心内容大纲。
- 主题: {user_input}
- 学科领域: {subject}
- 目标学员水平: {edu_level}
- 要求: 为每一页PPT提供标题和核心要点（3-5点）。内容应简洁、易于理解，并建议在何处使用图表或图像。总页数在10-15页之间。请使用Markdown格式输出。",
    ),
    (
        "练习题目",
        "你是一位资深的命题专家。请根据以下要求，设计一套练习题。
- 知识点: {user_input}
- 学科领域: {subject}
- 目标学员水平: {edu_level}
- 要求: 生成5-10道题目，包含至少2种题型（如选择题、填空题、简答题）。题目需覆盖核心知识点，并附上标准答案和解析。请使用Markdown格式输出。",
    ),
    (
        "案例分析",
        "你是一位行业分析师和教育家。请根据以下场景，撰写一份教学案例分析。
- 案例主题: {user_input}
- 学科领域: {subject}
- 目标学员水平: {edu_level}
- 要求: 案例需包含背景介绍、核心问题、分析过程和结论/启示。内容要具有深度和启发性。请使用Markdown格式输出。",
    ),
    (
        "实验指导",
        "你是一位实验室指导教师。请根据以下内容，编写一份清晰的实验指导手册。
- 实验名称: {user_input}
- 学科领域: {subject}
- 目标学员水平: {edu_level}
- 要求: 指导需包含实验目的、实验原理、所需器材、详细操作步骤、注意事项和数据记录表格。请使用Markdown格式输出。",
    ),
];

/// Used for any content type without its own template.
pub const GENERIC_TEMPLATE: &str = "请根据以下信息生成内容：{user_input}";

/// System message of single-shot content generation.
pub const CONTENT_SYSTEM_PROMPT: &str =
    "你是一位资深的教育内容生成专家，擅长创建各种类型的高质量教学资源。";

/// System message turning a refined prompt into a Markdown course outline.
pub const OUTLINE_SYSTEM_PROMPT: &str = "你是Tabler，一位专业的课程大纲设计师。\
根据用户提供的课程要求，生成一份完整的课程大纲。大纲按模块组织，每个模块给出模块名称、\
学习目标以及按顺序排列的课程（lesson）名称列表，模块数量必须与要求一致。\
请使用Markdown表格或分级列表输出，只输出大纲本身。";

/// System message turning an outline into the module -> lessons JSON object.
pub const STRUCTURE_PROMPT: &str = "你是Dictator，负责把课程大纲转换为结构化数据。\
阅读用户给出的课程大纲，输出一个JSON对象：键为模块名称（按大纲中的顺序），\
值为该模块下课程名称组成的字符串数组（按大纲中的顺序）。\
例如：{\"模块一：基础\": [\"课程1\", \"课程2\"], \"模块二：进阶\": [\"课程3\"]}。\
只输出JSON，不要输出任何解释、注释或Markdown代码块。";

/// Prefix of the quiz prompt; the module's accumulated lesson text follows.
pub const QUIZ_PROMPT: &str = "你是Quizzy，一位测验设计专家。根据下面的模块内容，\
设计一份模块测验：包含5道单项选择题（每题4个选项）和3道简答题，\
覆盖内容中的核心概念。在测验末尾单独给出所有题目的参考答案和简要解析。\
请使用Markdown格式输出。\n\n模块内容如下：\n\n";

/// Look up the template of a content type, falling back to [`GENERIC_TEMPLATE`].
pub fn template(content_type: &str) -> &'static str {
    CONTENT_TEMPLATES
        .iter()
        .find(|(label, _)| *label == content_type)
        .map(|(_, tpl)| *tpl)
        .unwrap_or(GENERIC_TEMPLATE)
}

/// Labels of the recognised content types.
pub fn content_types() -> Vec<&'static str> {
    CONTENT_TEMPLATES.iter().map(|(label, _)| *label).collect()
}

pub fn is_known_content_type(content_type: &str) -> bool {
    CONTENT_TEMPLATES.iter().any(|(label, _)| *label == content_type)
}

/// Fill a content-type template with topic, subject and audience level.
pub fn expand(content_type: &str, topic: &str, subject: &str, level: &str) -> String {
    fill(
        template(content_type),
        &[("user_input", topic), ("subject", subject), ("edu_level", level)],
    )
}

/// [`expand`] plus the supplementary requirements block.
pub fn expand_with_options(
    content_type: &str,
    topic: &str,
    subject: &str,
    level: &str,
    options: &ContentOptions,
) -> String {
    let mut prompt = expand(content_type, topic, subject, level);
    prompt.push_str("\n\n补充要求：");
    if !options.difficulty.trim().is_empty() {
        prompt.push_str(&format!("\n- 难度等级：{}", options.difficulty.trim()));
    }
    if !options.output_style.trim().is_empty() {
        prompt.push_str(&format!("\n- 输出风格：{}", options.output_style.trim()));
    }
    if options.include_examples {
        prompt.push_str("\n- 请包含具体实例和案例");
    }
    prompt
}

/// The "Prompter" meta-prompt: asks the model to write the prompt that the
/// outline designer will receive, embedding every form field.
pub fn meta_prompt(form: &CourseForm) -> String {
    let num_modules = form.num_modules.to_string();
    fill(
        "你是Prompter，世界上最好的提示工程师。我正在使用另一个GenAI工具Tabler，\
它帮助为培训师和专业人士生成课程大纲，用于自动课程内容生成。\
你的工作是严格使用以下输入：1）课程名称：{course_name} 2）目标受众教育水平：{edu_level} \
3）课程难度等级：{difficulty} 4）模块数量：{num_modules} 5）课程时长：{duration} \
6）课程学分：{credit}。为Tabler生成一个提示，以便它能产生最佳输出。\
你生成的提示必须全面，严格遵循上述输入，并在你生成的提示中提及给定的输入。\
此外，你的工作还包括识别课程名称是否合适，而不是胡言乱语。",
        &[
            ("course_name", form.course_name.trim()),
            ("edu_level", form.edu_level.trim()),
            ("difficulty", form.difficulty.trim()),
            ("num_modules", &num_modules),
            ("duration", form.duration.trim()),
            ("credit", form.credit.trim()),
        ],
    )
}

/// The "Coursify" instruction for one lesson of one module.
pub fn lesson_prompt(course_name: &str, module_name: &str, lesson_name: &str) -> String {
    fill(
        "你是Coursify，专门为在线课程生成高质量教育内容的AI助手。\
对于这个任务，你将为课程'{course_name}'中模块'{module_name}'的课程'{lesson_name}'生成详细内容。\
遵循布鲁姆分类法，从基础概念开始，逐步发展到高阶思维和应用。你的内容应包括：
1）介绍主题并说明其在课程和领域中的重要性；
2）定义并澄清关键术语、概念和原则，配合类比和例子；
3）逐步讲解核心概念，使用现实场景帮助理解；
4）讨论现实应用或案例研究；
5）加入反思问题或练习以巩固理解；
6）保持对话式、易于接近的语调，同时确保准确和深度。
请使用Markdown格式输出，并在内容末尾添加一个空行。",
        &[
            ("course_name", course_name),
            ("module_name", module_name),
            ("lesson_name", lesson_name),
        ],
    )
}

/// Quiz instruction seeded with the module's lesson text.
pub fn quiz_prompt(module_text: &str) -> String {
    format!("{QUIZ_PROMPT}{module_text}")
}

/// Ask for the full outline rewritten according to `instructions`.
pub fn modification_prompt(instructions: &str, outline: &str) -> String {
    fill(
        "我为您提供了\"课程大纲\"和\"修改要求\"。您的任务是使用提供的修改要求修改现有的课程大纲，\
并给出完整的修改后课程大纲作为输出。

修改要求：
{instructions}

原始课程大纲：
{outline}",
        &[("instructions", instructions), ("outline", outline)],
    )
}

fn fill(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_template_embeds_all_fields() {
        for content_type in content_types() {
            let prompt = expand(content_type, "Intro to Algebra", "Mathematics", "High School");
            assert!(prompt.contains("Intro to Algebra"), "{content_type}");
            assert!(prompt.contains("Mathematics"), "{content_type}");
            assert!(prompt.contains("High School"), "{content_type}");
            assert!(!prompt.contains('{'), "{content_type}");
        }
    }

    #[test]
    fn course_outline_template_keeps_scaffolding() {
        let prompt = expand("课程大纲", "Intro to Algebra", "Mathematics", "High School");
        assert!(prompt.starts_with("你是一位经验丰富的课程设计师"));
        assert!(prompt.contains("- 课程主题: Intro to Algebra"));
        assert!(prompt.contains("- 学科领域: Mathematics"));
        assert!(prompt.contains("- 目标学员水平: High School"));
        assert!(prompt.contains("请使用Markdown格式输出。"));
    }

    #[test]
    fn unknown_type_falls_back_to_generic() {
        assert!(!is_known_content_type("播客脚本"));
        assert_eq!(
            expand("播客脚本", "光合作用", "生物", "初中"),
            "请根据以下信息生成内容：光合作用"
        );
    }

    #[test]
    fn values_are_not_rescanned_for_placeholders() {
        let prompt = expand("练习题目", "{subject}", "化学", "高中");
        assert!(prompt.contains("- 知识点: {subject}"));
        assert!(prompt.contains("- 学科领域: 化学"));
    }

    #[test]
    fn options_append_requirements() {
        let options = ContentOptions {
            difficulty: "进阶".to_string(),
            output_style: "生动活泼".to_string(),
            include_examples: true,
        };
        let prompt = expand_with_options("案例分析", "供应链", "管理学", "本科", &options);
        assert!(prompt.ends_with(
            "补充要求：\n- 难度等级：进阶\n- 输出风格：生动活泼\n- 请包含具体实例和案例"
        ));

        let plain = ContentOptions {
            include_examples: false,
            ..ContentOptions::default()
        };
        let prompt = expand_with_options("案例分析", "供应链", "管理学", "本科", &plain);
        assert!(prompt.ends_with("补充要求："));
    }

    #[test]
    fn meta_prompt_embeds_form() {
        let form = CourseForm {
            course_name: "Python编程入门".to_string(),
            edu_level: "大专".to_string(),
            difficulty: "初级".to_string(),
            num_modules: 6,
            duration: "8周".to_string(),
            credit: "3学分".to_string(),
        };
        let prompt = meta_prompt(&form);
        for value in ["Python编程入门", "大专", "初级", "模块数量：6", "8周", "3学分"] {
            assert!(prompt.contains(value), "missing {value}");
        }
    }

    #[test]
    fn lesson_and_modification_prompts_embed_inputs() {
        let lesson = lesson_prompt("Algebra", "Equations", "Linear equations");
        assert!(lesson.contains("课程'Algebra'中模块'Equations'的课程'Linear equations'"));

        let modification = modification_prompt("add a module", "# Outline");
        assert!(modification.contains("修改要求：\nadd a module"));
        assert!(modification.ends_with("原始课程大纲：\n# Outline"));

        assert!(quiz_prompt("lesson text").ends_with("模块内容如下：\n\nlesson text"));
    }
}
