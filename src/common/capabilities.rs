// src/common/capabilities.rs
//
// Tabela declarativa de capacidades da superfície administrativa.
// Cada combinação (estado da entidade, papel do ator) resolve para um
// conjunto de campos editáveis e permissões de exclusão. Os handlers
// consultam a tabela em vez de ramificar imperativamente.

use crate::models::auth::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    // Operador privilegiado: vê e edita tudo.
    Operator,
    // Irmão comum: vê apenas os próprios registros.
    Brother,
}

impl Role {
    pub fn of(user: &User) -> Self {
        if user.is_superuser {
            Role::Operator
        } else {
            Role::Brother
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Caps {
    pub can_edit: bool,
    pub can_delete: bool,
    editable_fields: &'static [&'static str],
}

impl Caps {
    const FROZEN: Caps = Caps {
        can_edit: false,
        can_delete: false,
        editable_fields: &[],
    };

    pub fn allows(&self, field: &str) -> bool {
        self.can_edit && self.editable_fields.contains(&field)
    }
}

/// Solicitação de loja: aprovada fica congelada e indeletável para todos;
/// antes disso o irmão edita o conteúdo, mas nunca `approved` nem `user`.
pub fn store_request_caps(approved: bool, role: Role) -> Caps {
    match (approved, role) {
        (true, _) => Caps::FROZEN,
        (false, Role::Operator) => Caps {
            can_edit: true,
            can_delete: true,
            editable_fields: &["name", "city", "number", "user_id"],
        },
        (false, Role::Brother) => Caps {
            can_edit: true,
            can_delete: false,
            editable_fields: &["name", "city", "number"],
        },
    }
}

/// Solicitação de usuário: os campos de conteúdo são somente leitura desde
/// a criação; o operador ajusta a profissão. Aprovada, congela de vez.
pub fn user_request_caps(approved: bool, role: Role) -> Caps {
    match (approved, role) {
        (true, _) => Caps::FROZEN,
        (false, Role::Operator) => Caps {
            can_edit: true,
            can_delete: true,
            editable_fields: &["profession_id"],
        },
        (false, Role::Brother) => Caps::FROZEN,
    }
}

/// Solicitação de cancelamento: só o operador revisa ou exclui.
pub fn cancel_request_caps(role: Role) -> Caps {
    match role {
        Role::Operator => Caps {
            can_edit: true,
            can_delete: true,
            editable_fields: &["reviewed"],
        },
        Role::Brother => Caps::FROZEN,
    }
}

/// Evento: nunca é excluído pela superfície (apenas cancelamento lógico);
/// cancelado, todos os campos ficam somente leitura. O irmão não reatribui
/// o dono do evento.
pub fn event_caps(cancelled: bool, role: Role) -> Caps {
    match (cancelled, role) {
        (true, _) => Caps::FROZEN,
        (false, Role::Operator) => Caps {
            can_edit: true,
            can_delete: false,
            editable_fields: &[
                "user_id",
                "lodge_id",
                "title",
                "description",
                "start_time",
                "end_time",
                "address",
            ],
        },
        (false, Role::Brother) => Caps {
            can_edit: true,
            can_delete: false,
            editable_fields: &[
                "lodge_id",
                "title",
                "description",
                "start_time",
                "end_time",
                "address",
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solicitacao_de_loja_aprovada_congela_para_todos() {
        for role in [Role::Operator, Role::Brother] {
            let caps = store_request_caps(true, role);
            assert!(!caps.can_edit);
            assert!(!caps.can_delete);
            assert!(!caps.allows("name"));
        }
    }

    #[test]
    fn irmao_nao_edita_aprovacao_nem_dono() {
        let caps = store_request_caps(false, Role::Brother);
        assert!(caps.allows("name"));
        assert!(caps.allows("city"));
        assert!(!caps.allows("approved"));
        assert!(!caps.allows("user_id"));
        assert!(!caps.can_delete);
    }

    #[test]
    fn operador_exclui_solicitacao_pendente_mas_nao_aprovada() {
        assert!(store_request_caps(false, Role::Operator).can_delete);
        assert!(!store_request_caps(true, Role::Operator).can_delete);
        assert!(user_request_caps(false, Role::Operator).can_delete);
        assert!(!user_request_caps(true, Role::Operator).can_delete);
    }

    #[test]
    fn conteudo_da_solicitacao_de_usuario_e_somente_leitura() {
        let caps = user_request_caps(false, Role::Operator);
        assert!(caps.allows("profession_id"));
        assert!(!caps.allows("name"));
        assert!(!caps.allows("email"));
    }

    #[test]
    fn evento_nunca_e_deletavel_e_congela_ao_cancelar() {
        for (cancelled, role) in [
            (false, Role::Operator),
            (false, Role::Brother),
            (true, Role::Operator),
            (true, Role::Brother),
        ] {
            assert!(!event_caps(cancelled, role).can_delete);
        }
        assert!(!event_caps(true, Role::Operator).can_edit);
        assert!(event_caps(false, Role::Brother).allows("title"));
        assert!(!event_caps(false, Role::Brother).allows("user_id"));
        assert!(!event_caps(false, Role::Operator).allows("google_event_id"));
    }

    #[test]
    fn revisao_de_cancelamento_e_exclusiva_do_operador() {
        assert!(cancel_request_caps(Role::Operator).allows("reviewed"));
        assert!(!cancel_request_caps(Role::Brother).can_edit);
        assert!(!cancel_request_caps(Role::Brother).can_delete);
    }
}
